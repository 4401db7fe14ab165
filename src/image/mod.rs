pub mod io;
pub mod mask;
pub mod rgb;
pub mod size;
pub mod traits;
pub mod u8;

pub use self::mask::MaskU8;
pub use self::rgb::ImageRgb8;
pub use self::size::ImageSize;
pub use self::traits::{ImageView, ImageViewMut, Rows};
pub use self::u8::ImageU8;

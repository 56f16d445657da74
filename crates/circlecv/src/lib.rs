#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use circlecv_image as image;

#[doc(inline)]
pub use circlecv_imgproc as imgproc;

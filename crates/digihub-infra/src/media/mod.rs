//! Files under the media root.

mod resizer;

pub use resizer::FsImageResizer;

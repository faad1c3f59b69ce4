/// UI composition module
///
/// View helpers building iced widget trees from the headless state:
/// - The two-slot upload panel with the fuse button (uploader.rs)
/// - The live gallery grid (gallery.rs)

pub mod gallery;
pub mod uploader;

pub mod painter;
pub mod raster;
pub mod surface;
pub mod svg;

pub mod picking;
pub mod projection;
pub mod scene;

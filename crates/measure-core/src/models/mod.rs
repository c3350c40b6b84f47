//! Camera and depth-texture models.
//!
//! A depth-based measurement runs through two stages:
//!
//! 1. [`DepthMap`]: view tap -> texture pixel -> decoded binary16 depth.
//! 2. [`PinholeIntrinsics`]: pixel + depth -> camera-space point.
//!
//! The combined mapping is:
//! `point = backproject(view_to_pixel(tap), decode(depth[pixel]))`

mod depth;
mod intrinsics;

pub use depth::*;
pub use intrinsics::*;

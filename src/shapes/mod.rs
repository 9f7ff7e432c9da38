//! One validator per concrete shape of the external-object family.
//!
//! Each submodule opens with its rule tables; the code below them only adds
//! what a table cannot express: descent into nested containers and
//! cross-field rules.

mod common;
mod form;
mod group;
mod image;
mod opi;
mod reference;
mod resources;

pub(crate) use image::ImageRole;

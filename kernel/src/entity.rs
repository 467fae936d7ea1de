mod book;
mod common;
mod order;

pub use self::{book::*, common::*, order::*};

pub mod info;

pub use info::{ActiveModel, Column, Entity, Model};

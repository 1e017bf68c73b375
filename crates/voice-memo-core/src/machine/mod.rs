mod controller;
mod event;

pub use {
    controller::{MemoController, OpenHandle},
    event::MemoEvent,
};

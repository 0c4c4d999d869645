//! UI module - custom-painted widgets shared by the pages

pub mod components;

mod error;
mod launcher;
mod support;

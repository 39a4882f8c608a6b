mod config;
mod spawn;

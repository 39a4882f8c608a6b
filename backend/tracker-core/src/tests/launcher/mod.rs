mod output;
mod process;
mod spawn;

mod config;
mod error;
mod observers;
mod pool_diff;
mod probe;

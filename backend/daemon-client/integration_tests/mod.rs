mod helpers;
mod poll;
mod pool;
mod session;

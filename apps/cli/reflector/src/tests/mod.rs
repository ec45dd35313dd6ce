mod cli;
mod logger;
mod pool_table;

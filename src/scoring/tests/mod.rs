mod common;
mod keys;
mod pass;

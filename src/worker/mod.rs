mod worker;

pub use worker::Worker;

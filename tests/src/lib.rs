mod support;

mod batch;
mod loopback;
mod scenarios;

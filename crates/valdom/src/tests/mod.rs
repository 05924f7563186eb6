mod streaming;
mod support;

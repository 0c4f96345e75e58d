pub(crate) mod encoder;

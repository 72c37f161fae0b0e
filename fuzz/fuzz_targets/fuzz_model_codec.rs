#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use peer_protocol::core::parser::BinaryReader;
use peer_protocol::model::aggregate::register_aggregate_transaction_support;
use peer_protocol::model::registry::CodecBuilder;

fuzz_target!(|data: &[u8]| {
    let mut builder = CodecBuilder::new();
    register_aggregate_transaction_support(&mut builder).expect("empty builder");
    let codec = builder.build();

    let mut reader = BinaryReader::new();
    reader.push(Bytes::copy_from_slice(data));

    // arbitrary bytes must never panic the decoder
    let _ = codec.deserialize(&mut reader);
});

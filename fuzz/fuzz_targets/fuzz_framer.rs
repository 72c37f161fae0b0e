#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use peer_protocol::PacketFramer;

fuzz_target!(|data: &[u8]| {
    // feed the same bytes through several chunkings; framing must never
    // panic and must produce identical packets regardless of chunking
    for chunk_size in [1usize, 7, 64] {
        let mut framer = PacketFramer::new();
        for chunk in data.chunks(chunk_size) {
            if framer.push(Bytes::copy_from_slice(chunk)).is_err() {
                break;
            }
        }
        while framer.next_packet().is_some() {}
    }
});

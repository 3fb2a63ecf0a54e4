use std::io::Cursor;

use avro_interop_buffers::{ByteSink, ByteSource, IoSink, IoSource, Reader, Writer};
use proptest::prelude::*;

proptest! {
    #[test]
    fn writer_chunks_read_back_through_reader(chunks in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..64), 0..16)) {
        let mut writer = Writer::with_alloc_size(8);
        for chunk in &chunks {
            writer.write(chunk).unwrap();
        }
        let data = writer.flush();
        let mut reader = Reader::new(&data);
        for chunk in &chunks {
            prop_assert_eq!(&reader.read_vec(chunk.len()).unwrap(), chunk);
        }
        prop_assert!(reader.is_exhausted().unwrap());
    }

    #[test]
    fn io_sink_and_source_agree(data in prop::collection::vec(any::<u8>(), 0..512), split in 0usize..512) {
        let mut sink = IoSink::new(Vec::new());
        sink.write(&data).unwrap();
        let bytes = sink.into_inner();
        prop_assert_eq!(&bytes, &data);

        let split = split.min(data.len());
        let mut source = IoSource::new(Cursor::new(bytes));
        let head = source.read_vec(split).unwrap();
        source.skip(data.len() - split).unwrap();
        prop_assert_eq!(&head[..], &data[..split]);
        prop_assert!(source.is_exhausted().unwrap());
    }
}

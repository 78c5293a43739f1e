// Chunk Reader Tests
// End-to-end scenarios over in-memory containers: empty containers,
// padding, sibling search, truncation, recovery, and failing streams.

#[cfg(test)]
mod scenario_tests {
    use crate::riff::{ChunkHeader, ChunkReader, FourCc, ReadError, ReaderState};
    use std::io::Cursor;

    fn id(s: &[u8; 4]) -> FourCc {
        FourCc::new(*s)
    }

    /// Container prolog with the size field computed from `body`
    fn container(body: &[u8]) -> Vec<u8> {
        let mut data = b"RIFF".to_vec();
        data.extend_from_slice(&((body.len() + 4) as u32).to_le_bytes());
        data.extend_from_slice(b"TEST");
        data.extend_from_slice(body);
        data
    }

    fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn open(data: Vec<u8>) -> ChunkReader<Cursor<Vec<u8>>> {
        let mut reader = ChunkReader::new();
        reader
            .open_stream(Cursor::new(data))
            .expect("container should open");
        reader
    }

    #[test]
    fn test_empty_container_is_end() {
        let mut reader = open(container(&[]));
        assert!(matches!(reader.read_chunk_info(), Err(ReadError::End)));
        assert_eq!(reader.state(), ReaderState::ChunkInfo);
        // End is repeatable and harmless
        assert!(matches!(reader.read_chunk_info(), Err(ReadError::End)));
        assert_eq!(reader.position().unwrap(), 12);
    }

    #[test]
    fn test_single_odd_chunk_with_pad() {
        let mut reader = open(container(&chunk(b"TEST", b"hello")));

        let header = reader.read_chunk_info().unwrap();
        assert_eq!(header, ChunkHeader::new(id(b"TEST"), 5));

        let mut buf = [0u8; 5];
        reader.read_chunk_data(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        assert_eq!(reader.position().unwrap(), 12 + 8 + 6);
        assert!(matches!(reader.read_chunk_info(), Err(ReadError::End)));
    }

    #[test]
    fn test_find_second_sibling() {
        let mut body = chunk(b"one ", b"first payload");
        body.extend(chunk(b"two ", b"second"));
        let mut reader = open(container(&body));

        let header = reader.find_chunk(id(b"two ")).unwrap();
        assert_eq!(header, ChunkHeader::new(id(b"two "), 6));
        assert_eq!(reader.state(), ReaderState::ChunkData);
        assert_eq!(reader.read_chunk_vec().unwrap(), b"second");
    }

    #[test]
    fn test_find_from_chunk_data_skips_current() {
        let mut body = chunk(b"same", b"a");
        body.extend(chunk(b"same", b"b"));
        let mut reader = open(container(&body));

        reader.read_chunk_info().unwrap();
        reader.find_chunk(id(b"same")).unwrap();
        assert_eq!(reader.read_chunk_vec().unwrap(), b"b");
    }

    #[test]
    fn test_find_miss_restores_everything() {
        let mut body = chunk(b"one ", b"abc");
        body.extend(chunk(b"two ", b"de"));
        let mut reader = open(container(&body));

        reader.read_chunk_info().unwrap();
        let before = reader.bookmark().unwrap();

        assert!(matches!(
            reader.find_chunk(id(b"nope")),
            Err(ReadError::End)
        ));
        assert_eq!(reader.bookmark().unwrap(), before);
        assert_eq!(reader.state(), ReaderState::ChunkData);
        assert_eq!(reader.read_chunk_vec().unwrap(), b"abc");
    }

    #[test]
    fn test_truncated_payload_then_wrong_state() {
        let mut body = b"big ".to_vec();
        body.extend_from_slice(&100u32.to_le_bytes());
        body.extend_from_slice(&[7u8; 40]);
        let mut reader = open(container(&body));

        reader.read_chunk_info().unwrap();
        let mut buf = vec![0u8; 100];
        assert!(matches!(
            reader.read_chunk_data(&mut buf),
            Err(ReadError::BadFormat(_))
        ));
        assert_eq!(reader.state(), ReaderState::Unknown);
        assert!(matches!(
            reader.read_chunk_data(&mut buf),
            Err(ReadError::WrongState {
                state: ReaderState::Unknown,
                ..
            })
        ));
        assert!(reader.find_chunk(id(b"big ")).unwrap_err().is_wrong_state());
        assert!(reader.seek_next_chunk().unwrap_err().is_wrong_state());
    }

    #[test]
    fn test_reposition_recovers_from_unknown() {
        let mut body = chunk(b"good", b"ok");
        body.extend_from_slice(b"bad ");
        body.extend_from_slice(&50u32.to_le_bytes());
        body.extend_from_slice(b"short");
        let mut reader = open(container(&body));

        let good = reader.bookmark().unwrap();
        reader.seek_next_chunk().unwrap();
        reader.read_chunk_info().unwrap();
        assert!(reader.read_chunk_vec().unwrap_err().is_bad_format());
        assert_eq!(reader.state(), ReaderState::Unknown);

        reader
            .reposition(good.offset, good.header, ReaderState::ChunkInfo)
            .unwrap();
        let header = reader.read_chunk_info().unwrap();
        assert_eq!(header.id, id(b"good"));
        assert_eq!(reader.read_chunk_vec().unwrap(), b"ok");
    }

    #[test]
    fn test_ascend_from_subchunks() {
        let mut inner = chunk(b"kid1", b"x");
        inner.extend(chunk(b"kid2", b"yz"));
        let mut body = chunk(b"wrap", &inner);
        body.extend(chunk(b"tail", b"t"));
        let mut reader = open(container(&body));

        let parent = reader.read_chunk_info().unwrap();
        let parent_end = reader.chunk_end().unwrap();
        reader.sink_to_subchunks().unwrap();
        assert_eq!(reader.find_chunk(id(b"kid2")).unwrap().length, 2);

        reader
            .reposition(parent_end, parent, ReaderState::ChunkInfo)
            .unwrap();
        assert_eq!(reader.read_chunk_info().unwrap().id, id(b"tail"));
    }

    #[test]
    fn test_unfenced_sink_runs_into_siblings() {
        // Subchunk scanning is not bounded by the parent's length.
        let mut body = chunk(b"wrap", &chunk(b"kid ", b"ab"));
        body.extend(chunk(b"sibl", b"cd"));
        let mut reader = open(container(&body));

        reader.read_chunk_info().unwrap();
        reader.sink_to_subchunks().unwrap();
        let found = reader.find_chunk(id(b"sibl")).unwrap();
        assert_eq!(found.length, 2);
    }

    #[test]
    fn test_end_never_produces_unknown() {
        let mut reader = open(container(&chunk(b"only", b"1234")));
        reader.seek_next_chunk().unwrap();
        for _ in 0..3 {
            assert!(reader.seek_next_chunk().unwrap_err().is_end());
            assert!(reader.find_chunk(id(b"only")).unwrap_err().is_end());
            assert_eq!(reader.state(), ReaderState::ChunkInfo);
        }
    }
}

#[cfg(test)]
mod stream_failure_tests {
    use crate::riff::{ChunkHeader, ChunkReader, FourCc, ReadError, ReaderState};
    use std::io::{self, Cursor, Read, Seek, SeekFrom};

    /// Cursor that fails every read once `fail_after` bytes were served, or
    /// every seek when `fail_seeks` is set
    struct FlakyStream {
        inner: Cursor<Vec<u8>>,
        fail_after: u64,
        fail_seeks: bool,
    }

    impl Read for FlakyStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.inner.position() >= self.fail_after {
                return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
            }
            let limit = (self.fail_after - self.inner.position()) as usize;
            let len = buf.len().min(limit);
            self.inner.read(&mut buf[..len])
        }
    }

    impl Seek for FlakyStream {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            if self.fail_seeks {
                return Err(io::Error::new(io::ErrorKind::Other, "seek failed"));
            }
            self.inner.seek(pos)
        }
    }

    /// Serves one byte per read call
    struct TrickleStream(Cursor<Vec<u8>>);

    impl Read for TrickleStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = buf.len().min(1);
            self.0.read(&mut buf[..len])
        }
    }

    impl Seek for TrickleStream {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.0.seek(pos)
        }
    }

    fn sample() -> Vec<u8> {
        let mut data = b"RIFF\x14\x00\x00\x00WAVE".to_vec();
        data.extend_from_slice(b"data\x04\x00\x00\x00abcd");
        data
    }

    #[test]
    fn test_short_reads_are_reassembled() {
        let mut reader = ChunkReader::new();
        reader
            .open_stream(TrickleStream(Cursor::new(sample())))
            .unwrap();
        let header = reader.read_chunk_info().unwrap();
        assert_eq!(header.id, FourCc::new(*b"data"));
        let mut buf = [0u8; 4];
        reader.read_chunk_data(&mut buf).unwrap();
        assert_eq!(&buf, b"abcd");
    }

    #[test]
    fn test_io_error_in_payload_leaves_unknown() {
        let mut reader = ChunkReader::new();
        reader
            .open_stream(FlakyStream {
                inner: Cursor::new(sample()),
                fail_after: 22,
                fail_seeks: false,
            })
            .unwrap();
        reader.read_chunk_info().unwrap();
        let mut buf = [0u8; 4];
        assert!(matches!(
            reader.read_chunk_data(&mut buf),
            Err(ReadError::Io(_))
        ));
        assert_eq!(reader.state(), ReaderState::Unknown);
    }

    #[test]
    fn test_io_error_before_header_leaves_unknown() {
        let mut reader = ChunkReader::new();
        reader
            .open_stream(FlakyStream {
                inner: Cursor::new(sample()),
                fail_after: 12,
                fail_seeks: false,
            })
            .unwrap();
        assert!(matches!(reader.read_chunk_info(), Err(ReadError::Io(_))));
        assert_eq!(reader.state(), ReaderState::Unknown);

        reader
            .reposition(12, ChunkHeader::default(), ReaderState::ChunkInfo)
            .unwrap();
        assert_eq!(reader.state(), ReaderState::ChunkInfo);
    }

    #[test]
    fn test_io_error_inside_chunk_id_leaves_unknown() {
        // Prolog and "da" are served, then the stream fails.
        let mut reader = ChunkReader::new();
        reader
            .open_stream(FlakyStream {
                inner: Cursor::new(sample()),
                fail_after: 14,
                fail_seeks: false,
            })
            .unwrap();
        assert!(matches!(reader.read_chunk_info(), Err(ReadError::Io(_))));
        assert_eq!(reader.state(), ReaderState::Unknown);
        assert!(reader.read_chunk_info().unwrap_err().is_wrong_state());
    }

    #[test]
    fn test_io_error_inside_chunk_id_during_find_leaves_unknown() {
        let mut reader = ChunkReader::new();
        reader
            .open_stream(FlakyStream {
                inner: Cursor::new(sample()),
                fail_after: 14,
                fail_seeks: false,
            })
            .unwrap();
        assert!(matches!(
            reader.find_chunk(FourCc::new(*b"data")),
            Err(ReadError::Io(_))
        ));
        assert_eq!(reader.state(), ReaderState::Unknown);
    }

    #[test]
    fn test_failed_rewind_of_partial_id_leaves_unknown() {
        let mut data = b"RIFF\x06\x00\x00\x00WAVE".to_vec();
        data.extend_from_slice(b"da");
        let mut reader = ChunkReader::new();
        reader
            .open_stream(FlakyStream {
                inner: Cursor::new(data),
                fail_after: u64::MAX,
                fail_seeks: true,
            })
            .unwrap();
        assert!(matches!(reader.read_chunk_info(), Err(ReadError::Io(_))));
        assert_eq!(reader.state(), ReaderState::Unknown);
    }

    #[test]
    fn test_seek_error_in_reposition_leaves_unknown() {
        let mut reader = ChunkReader::new();
        reader
            .open_stream(FlakyStream {
                inner: Cursor::new(sample()),
                fail_after: u64::MAX,
                fail_seeks: true,
            })
            .unwrap();
        reader.read_chunk_info().unwrap();
        let err = reader
            .reposition(12, ChunkHeader::default(), ReaderState::ChunkInfo)
            .unwrap_err();
        assert!(matches!(err, ReadError::Io(_)));
        assert_eq!(reader.state(), ReaderState::Unknown);
    }

    #[test]
    fn test_seek_error_while_skipping_leaves_unknown() {
        let mut reader = ChunkReader::new();
        reader
            .open_stream(FlakyStream {
                inner: Cursor::new(sample()),
                fail_after: u64::MAX,
                fail_seeks: true,
            })
            .unwrap();
        reader.read_chunk_info().unwrap();
        assert!(matches!(reader.seek_next_chunk(), Err(ReadError::Io(_))));
        assert_eq!(reader.state(), ReaderState::Unknown);
    }
}

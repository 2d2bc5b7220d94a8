//! Unit tests for frame construction, slicing, validation and encoding.

use std::{
    io::{self, Write},
    sync::Arc,
};

use bytes::Bytes;
use proptest::{
    collection::vec,
    prelude::any,
    prop_assert_eq,
    test_runner::{Config as ProptestConfig, RngAlgorithm, TestCaseError, TestRng, TestRunner},
};
use rstest::{fixture, rstest};

use super::{
    FireAndForget,
    Frame,
    FrameFlags,
    FrameHeader,
    FrameType,
    HEADER_LEN,
    METADATA_LEN_SIZE,
    PayloadFrame,
    RequestChannel,
    RequestResponse,
    RequestStream,
    StreamId,
};
use crate::{
    buffer::{PoolHandle, SharedBufferPool},
    error::FrameError,
};

fn deterministic_runner(cases: u32) -> TestRunner {
    let config = ProptestConfig {
        cases,
        ..ProptestConfig::default()
    };
    TestRunner::new_with_rng(config, TestRng::deterministic_rng(RngAlgorithm::ChaCha))
}

/// Encode `frame` into a fresh vector, asserting the byte count matches
/// `size()`.
fn encode(frame: &impl PayloadFrame) -> Vec<u8> {
    let mut out = Vec::new();
    let written = frame.write_to(&mut out).expect("writing to a Vec cannot fail");
    assert_eq!(written, frame.size());
    assert_eq!(out.len(), written);
    out
}

fn raw_frame(frame_type: FrameType, flags: FrameFlags, body: &[u8]) -> Bytes {
    let header = FrameHeader::new(StreamId::new(1), frame_type, flags);
    let mut raw = header.encode().to_vec();
    raw.extend_from_slice(body);
    Bytes::from(raw)
}

/// Sink that accepts `limit` bytes in total and then fails.
struct FailingWriter {
    accepted: Vec<u8>,
    limit: usize,
}

impl Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let room = self.limit - self.accepted.len();
        if room == 0 {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        let n = room.min(buf.len());
        self.accepted.extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

/// Sink that reports `Interrupted` on every other call and accepts one byte
/// at a time otherwise.
#[derive(Default)]
struct FlakyWriter {
    out: Vec<u8>,
    interrupt_next: bool,
}

impl Write for FlakyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.interrupt_next = !self.interrupt_next;
        if self.interrupt_next {
            return Err(io::Error::from(io::ErrorKind::Interrupted));
        }
        self.out.push(buf[0]);
        Ok(1)
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

struct ZeroWriter;

impl Write for ZeroWriter {
    fn write(&mut self, _: &[u8]) -> io::Result<usize> { Ok(0) }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

#[fixture]
fn pool() -> Arc<SharedBufferPool> { Arc::new(SharedBufferPool::default()) }

#[test]
fn fire_and_forget_with_metadata() {
    let frame = FireAndForget::new(StreamId::new(7), b"hello", b"world", FrameFlags::empty());

    assert_eq!(frame.stream_id().get(), 7);
    assert_eq!(frame.header().frame_type(), FrameType::RequestFnf);
    assert!(frame.flags().contains(FrameFlags::METADATA));
    assert_eq!(frame.metadata(), Some(&b"world"[..]));
    assert_eq!(frame.data(), b"hello");
    assert_eq!(frame.size(), HEADER_LEN + METADATA_LEN_SIZE + 5 + 5);
    assert_eq!(
        encode(&frame),
        b"\x00\x00\x00\x07\x15\x00\x00\x00\x05worldhello".to_vec()
    );
}

#[test]
fn request_channel_carries_initial_request_n() {
    let frame = RequestChannel::new(StreamId::new(3), 42, b"x", b"", FrameFlags::empty());

    assert_eq!(frame.initial_request_n(), 42);
    assert!(!frame.flags().contains(FrameFlags::METADATA));
    assert_eq!(frame.metadata(), None);
    assert_eq!(frame.data(), b"x");
    assert_eq!(frame.size(), HEADER_LEN + RequestChannel::FIXED_LEN + 1);
    assert_eq!(encode(&frame), b"\x00\x00\x00\x03\x1c\x00\x00\x00\x00\x2ax".to_vec());
}

#[rstest]
#[case::empty(FrameFlags::empty())]
#[case::caller_set_metadata(FrameFlags::METADATA)]
fn empty_metadata_clears_flag(#[case] flags: FrameFlags) {
    let frame = FireAndForget::new(StreamId::new(1), b"data", b"", flags);
    assert!(!frame.flags().contains(FrameFlags::METADATA));
    assert_eq!(frame.metadata(), None);
    assert_eq!(frame.metadata_utf8(), None);
    assert_eq!(frame.size(), HEADER_LEN + 4);
}

#[test]
fn caller_flags_other_than_metadata_are_kept() {
    let frame = RequestStream::new(
        StreamId::new(9),
        1,
        b"",
        b"m",
        FrameFlags::FOLLOWS | FrameFlags::IGNORE,
    );
    let flags = frame.flags();
    assert!(flags.contains(FrameFlags::FOLLOWS | FrameFlags::IGNORE | FrameFlags::METADATA));
    assert!(!flags.contains(FrameFlags::COMPLETE));
    assert!(frame.data().is_empty());
}

#[rstest]
fn dropping_frame_releases_buffer(pool: Arc<SharedBufferPool>) {
    let handle = Arc::clone(&pool) as PoolHandle;
    let frame = RequestResponse::new_in(&handle, StreamId::new(5), b"ping", b"", FrameFlags::empty());
    assert_eq!(pool.retained(), 0);
    drop(frame);
    assert_eq!(pool.retained(), 1);
}

#[rstest]
fn failed_write_still_releases_buffer(pool: Arc<SharedBufferPool>) {
    let handle = Arc::clone(&pool) as PoolHandle;
    {
        let frame = FireAndForget::new_in(&handle, StreamId::new(5), b"a", b"b", FrameFlags::empty());
        assert!(frame.write_to(&mut ZeroWriter).is_err());
    }
    assert_eq!(pool.retained(), 1);
}

#[rstest]
#[case::inside_header(3)]
#[case::inside_metadata(10)]
#[case::inside_data(15)]
fn partial_write_reports_accepted_bytes(#[case] limit: usize) {
    let frame = FireAndForget::new(StreamId::new(7), b"hello", b"world", FrameFlags::empty());
    let mut sink = FailingWriter {
        accepted: Vec::new(),
        limit,
    };

    let err = frame.write_to(&mut sink).expect_err("sink runs out of room");

    assert_eq!(err.written, limit);
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    assert_eq!(sink.accepted, encode(&frame)[..limit].to_vec());
}

#[test]
fn interrupted_writes_are_retried() {
    let frame = RequestChannel::new(StreamId::new(2), 8, b"data", b"meta", FrameFlags::empty());
    let mut sink = FlakyWriter::default();

    let written = frame.write_to(&mut sink).expect("interruptions are retried");

    assert_eq!(written, frame.size());
    assert_eq!(sink.out, encode(&frame));
}

#[test]
fn zero_length_write_is_an_error() {
    let frame = FireAndForget::new(StreamId::new(1), b"x", b"", FrameFlags::empty());
    let err = frame.write_to(&mut ZeroWriter).expect_err("sink accepts nothing");
    assert_eq!(err.written, 0);
    assert_eq!(err.kind(), io::ErrorKind::WriteZero);
}

#[rstest]
#[case::empty(&[][..], false)]
#[case::three_bytes(&[0, 0, 1][..], false)]
#[case::exact(&[0, 0, 0, 1][..], true)]
#[case::with_data(&[0, 0, 0, 1, b'd'][..], true)]
fn request_channel_requires_fixed_fields(#[case] body: &[u8], #[case] valid: bool) {
    let raw = raw_frame(FrameType::RequestChannel, FrameFlags::empty(), body);
    match Frame::from_bytes(raw) {
        Ok(frame) => {
            assert!(valid, "short body was accepted");
            assert!(frame.validate().is_ok());
        }
        Err(err) => {
            assert!(!valid, "valid body was rejected: {err}");
            assert_eq!(
                err,
                FrameError::IncompleteFrame {
                    need: 4,
                    have: body.len(),
                }
            );
        }
    }
}

#[test]
fn fire_and_forget_accepts_empty_body() {
    let frame = Frame::from_bytes(raw_frame(FrameType::RequestFnf, FrameFlags::empty(), &[]))
        .expect("no fixed fields to check");
    assert!(frame.data().is_empty());
    assert_eq!(frame.size(), HEADER_LEN);
}

#[test]
fn decoded_frame_slices_without_copying() {
    let raw = raw_frame(
        FrameType::RequestStream,
        FrameFlags::METADATA,
        b"\x00\x00\x00\x10\x00\x00\x02mddata",
    );
    let base = raw.as_ptr() as usize;
    let frame = Frame::from_bytes(raw).expect("valid frame");

    let Frame::RequestStream(stream) = &frame else {
        panic!("expected RequestStream, got {frame:?}");
    };
    assert_eq!(stream.initial_request_n(), 16);
    let metadata = frame.metadata().expect("metadata flag is set");
    assert_eq!(metadata, b"md");
    assert_eq!(frame.data(), b"data");
    assert_eq!(metadata.as_ptr() as usize, base + HEADER_LEN + 4 + METADATA_LEN_SIZE);
    assert_eq!(frame.data().as_ptr() as usize, base + HEADER_LEN + 9);
}

#[test]
fn truncated_metadata_is_clamped() {
    let raw = raw_frame(FrameType::RequestFnf, FrameFlags::METADATA, b"\x00\x00\x0aab");
    let frame = Frame::from_bytes(raw).expect("fire-and-forget has no fixed fields");

    assert_eq!(frame.metadata(), Some(&b"ab"[..]));
    assert!(frame.data().is_empty());
    assert_eq!(frame.size(), HEADER_LEN + METADATA_LEN_SIZE + 2);
    assert_eq!(encode(&frame)[HEADER_LEN..], b"\x00\x00\x02ab"[..]);
}

#[test]
fn body_shorter_than_length_prefix_does_not_panic() {
    let raw = raw_frame(FrameType::RequestFnf, FrameFlags::METADATA, b"\x01");
    let frame = Frame::from_bytes(raw).expect("fire-and-forget has no fixed fields");
    assert_eq!(frame.metadata(), Some(&b""[..]));
    assert!(frame.data().is_empty());
    encode(&frame);
}

#[rstest]
#[case::short_header(&[0, 0, 0][..], FrameError::IncompleteHeader { have: 3, need: HEADER_LEN })]
#[case::unknown_type(&[0, 0, 0, 1, 0x04, 0x00][..], FrameError::UnknownFrameType(0x01))]
fn malformed_headers_are_rejected(#[case] raw: &[u8], #[case] expected: FrameError) {
    let err = Frame::from_bytes(Bytes::copy_from_slice(raw)).expect_err("malformed header");
    assert_eq!(err, expected);
}

#[test]
fn header_round_trips_all_flags() {
    let flags = FrameFlags::from_bits_truncate(0xFFFF);
    assert_eq!(flags.bits(), 0x03FF);
    let header = FrameHeader::new(StreamId::new(0x7FFF_FFFF), FrameType::RequestChannel, flags);
    let decoded = FrameHeader::decode(&header.encode()).expect("valid header");
    assert_eq!(decoded, header);
}

#[test]
fn reserved_stream_id_bit_is_cleared_only_on_the_wire() {
    let frame = FireAndForget::new(StreamId::new(0x8000_0001), b"x", b"", FrameFlags::empty());
    assert_eq!(frame.stream_id().get(), 0x8000_0001);

    let bytes = encode(&frame);
    assert_eq!(&bytes[..4], &[0, 0, 0, 1]);

    let decoded = Frame::from_bytes(Bytes::from(bytes)).expect("valid frame");
    assert_eq!(decoded.stream_id(), StreamId::new(1));
}

#[test]
fn display_names_type_flags_and_payload() {
    let frame = FireAndForget::new(StreamId::new(7), b"hello", b"world", FrameFlags::empty());
    assert_eq!(
        frame.to_string(),
        "FireAndForget{stream_id=7,type=REQUEST_FNF,flags=M,data=hello,metadata=world}"
    );

    let frame = Frame::from(RequestChannel::new(
        StreamId::new(3),
        42,
        b"x",
        b"",
        FrameFlags::COMPLETE,
    ));
    assert_eq!(
        frame.to_string(),
        "RequestChannel{stream_id=3,type=REQUEST_CHANNEL,flags=C,data=x,metadata=,initial_request_n=42}"
    );
}

#[test]
fn utf8_views_replace_invalid_sequences() {
    let frame = RequestResponse::new(StreamId::new(1), b"ok\xff", b"m", FrameFlags::empty());
    assert_eq!(frame.data_utf8(), "ok\u{fffd}");
    assert_eq!(frame.metadata_utf8().as_deref(), Some("m"));
}

#[rstest]
#[case(FrameType::RequestResponse)]
#[case(FrameType::RequestFnf)]
#[case(FrameType::RequestStream)]
#[case(FrameType::RequestChannel)]
fn generated_frames_encode_exactly_size_bytes(#[case] frame_type: FrameType) {
    let mut runner = deterministic_runner(64);
    let strategy = (
        0..=0x7FFF_FFFFu32,
        any::<u32>(),
        vec(any::<u8>(), 0..64),
        vec(any::<u8>(), 0..64),
        any::<u16>(),
    );

    runner
        .run(&strategy, |(stream, n, data, metadata, bits)| {
            let stream_id = StreamId::new(stream);
            let flags = FrameFlags::from_bits_truncate(bits);
            let frame: Frame = match frame_type {
                FrameType::RequestResponse => {
                    RequestResponse::new(stream_id, &data, &metadata, flags).into()
                }
                FrameType::RequestFnf => {
                    FireAndForget::new(stream_id, &data, &metadata, flags).into()
                }
                FrameType::RequestStream => {
                    RequestStream::new(stream_id, n, &data, &metadata, flags).into()
                }
                FrameType::RequestChannel => {
                    RequestChannel::new(stream_id, n, &data, &metadata, flags).into()
                }
            };

            let mut wire = Vec::new();
            let written = frame
                .write_to(&mut wire)
                .map_err(|err| TestCaseError::fail(format!("encode failed: {err}")))?;
            prop_assert_eq!(written, frame.size());
            prop_assert_eq!(wire.len(), written);

            let decoded = Frame::from_bytes(Bytes::from(wire))
                .map_err(|err| TestCaseError::fail(format!("decode failed: {err}")))?;
            prop_assert_eq!(decoded.frame_type(), frame_type);
            prop_assert_eq!(decoded.stream_id(), stream_id);
            prop_assert_eq!(decoded.flags(), frame.flags());
            prop_assert_eq!(decoded.data(), &data[..]);
            prop_assert_eq!(decoded.metadata(), (!metadata.is_empty()).then_some(&metadata[..]));
            prop_assert_eq!(decoded.size(), frame.size());
            Ok(())
        })
        .expect("generated frames should encode to size() bytes and decode back");
}

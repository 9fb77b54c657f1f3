use flatimg::*;

// Premultiplied BGRA.
const RED: [u8; 4] = [0, 0, 255, 255];
const BLUE: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const CLEAR: [u8; 4] = [0, 0, 0, 0];

fn gif_bytes(width: u16, height: u16, frames: &[gif::Frame<'_>]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, &[]).unwrap();
        for frame in frames {
            encoder.write_frame(frame).unwrap();
        }
    }
    out
}

fn frame_at(
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    palette: &[u8],
    indices: &[u8],
) -> gif::Frame<'static> {
    let mut frame = gif::Frame::default();
    frame.left = left;
    frame.top = top;
    frame.width = width;
    frame.height = height;
    frame.palette = Some(palette.to_vec());
    frame.buffer = indices.to_vec().into();
    frame
}

fn px(surface: &Surface, x: u32, y: u32) -> [u8; 4] {
    let off = ((y * surface.width + x) * 4) as usize;
    let b = surface.as_bytes();
    [b[off], b[off + 1], b[off + 2], b[off + 3]]
}

#[test]
fn frames_composite_onto_a_full_canvas() {
    let mut first = frame_at(0, 0, 2, 2, &[255, 0, 0], &[0; 4]);
    first.delay = 10; // GIF delay is in 10 ms units
    let mut second = frame_at(1, 1, 1, 1, &[0, 0, 255], &[0]);
    second.delay = 5;
    let data = gif_bytes(2, 2, &[first, second]);

    let animation = DecodeRequest::new(&data).decode_frames().unwrap();
    assert_eq!((animation.width, animation.height), (2, 2));
    assert_eq!(animation.frame_count(), 2);
    for frame in animation.frames() {
        // Every snapshot is full-canvas, whatever rect the file stored.
        assert_eq!((frame.width, frame.height), (2, 2));
        assert_eq!(frame.as_bytes().len(), 16);
        assert_eq!(frame.order, PixelOrder::Bgra);
    }

    assert_eq!(animation.frames()[0].as_bytes(), &RED.repeat(4));
    let second = &animation.frames()[1];
    assert_eq!(px(second, 0, 0), RED);
    assert_eq!(px(second, 0, 1), RED);
    assert_eq!(px(second, 1, 0), RED);
    assert_eq!(px(second, 1, 1), BLUE);

    assert_eq!(animation.delays_ms(), Some(&[100, 50][..]));
}

#[test]
fn transparent_pixels_blend_source_over() {
    let first = frame_at(0, 0, 2, 2, &[255, 0, 0], &[0; 4]);
    let mut second = frame_at(0, 0, 1, 1, &[0, 0, 0], &[0]);
    second.transparent = Some(0);
    let data = gif_bytes(2, 2, &[first, second]);

    let animation = DecodeRequest::new(&data).decode_frames().unwrap();
    assert_eq!(animation.frame_count(), 2);
    // The all-transparent second frame leaves the red canvas visible.
    assert_eq!(
        animation.frames()[1].as_bytes(),
        animation.frames()[0].as_bytes()
    );
}

#[test]
fn restore_background_clears_only_the_frame_rect() {
    let first = frame_at(0, 0, 2, 2, &[255, 0, 0], &[0; 4]);
    let mut second = frame_at(1, 1, 1, 1, &[0, 255, 0], &[0]);
    second.dispose = gif::DisposalMethod::Background;
    // Draws nothing; snapshots the canvas after disposal ran.
    let mut third = frame_at(0, 0, 1, 1, &[0, 0, 0], &[0]);
    third.transparent = Some(0);
    let data = gif_bytes(2, 2, &[first, second, third]);

    let animation = DecodeRequest::new(&data).decode_frames().unwrap();
    let frames = animation.frames();
    assert_eq!(animation.frame_count(), 3);
    assert_eq!(px(&frames[1], 1, 1), GREEN);
    // Disposal cleared the 1x1 rect to transparent, nothing else.
    assert_eq!(px(&frames[2], 1, 1), CLEAR);
    assert_eq!(px(&frames[2], 0, 0), RED);
    assert_eq!(px(&frames[2], 1, 0), RED);
    assert_eq!(px(&frames[2], 0, 1), RED);
}

#[test]
fn restore_previous_rolls_the_canvas_back() {
    let first = frame_at(0, 0, 2, 2, &[255, 0, 0], &[0; 4]);
    let mut second = frame_at(1, 1, 1, 1, &[0, 0, 255], &[0]);
    second.dispose = gif::DisposalMethod::Previous;
    let mut third = frame_at(0, 0, 1, 1, &[0, 0, 0], &[0]);
    third.transparent = Some(0);
    let data = gif_bytes(2, 2, &[first, second, third]);

    let animation = DecodeRequest::new(&data).decode_frames().unwrap();
    let frames = animation.frames();
    assert_eq!(px(&frames[1], 1, 1), BLUE);
    // The blue pixel was rolled back before the third snapshot.
    assert_eq!(frames[2].as_bytes(), frames[0].as_bytes());
}

#[test]
fn single_frame_gif_has_one_snapshot() {
    let data = gif_bytes(2, 1, &[frame_at(0, 0, 2, 1, &[7, 8, 9], &[0, 0])]);
    let animation = DecodeRequest::new(&data).decode_frames().unwrap();
    assert_eq!(animation.frame_count(), 1);
    assert_eq!(animation.frames()[0].as_bytes(), &[9, 8, 7, 255, 9, 8, 7, 255]);

    let (frames, delays) = animation.into_parts();
    assert_eq!(frames.len(), 1);
    assert_eq!(delays, Some(vec![0]));
}

#[test]
fn delay_reporting_can_be_disabled() {
    let mut first = frame_at(0, 0, 1, 1, &[255, 0, 0], &[0]);
    first.delay = 10;
    let data = gif_bytes(1, 1, &[first]);

    let animation = DecodeRequest::new(&data)
        .with_delays(false)
        .decode_frames()
        .unwrap();
    assert_eq!(animation.frame_count(), 1);
    assert_eq!(animation.delays_ms(), None);
}

#[test]
fn rgba_order_applies_to_every_frame() {
    let first = frame_at(0, 0, 1, 1, &[10, 20, 30], &[0]);
    let second = frame_at(0, 0, 1, 1, &[40, 50, 60], &[0]);
    let data = gif_bytes(1, 1, &[first, second]);

    let animation = DecodeRequest::new(&data)
        .order(PixelOrder::Rgba)
        .decode_frames()
        .unwrap();
    assert_eq!(animation.frames()[0].order, PixelOrder::Rgba);
    assert_eq!(animation.frames()[0].as_bytes(), &[10, 20, 30, 255]);
    assert_eq!(animation.frames()[1].as_bytes(), &[40, 50, 60, 255]);
}

#[test]
fn non_gif_input_is_rejected() {
    let err = DecodeRequest::new(b"not a gif at all").decode_frames().unwrap_err();
    assert!(matches!(err, DecodeError::InvalidHeader(_)));

    assert!(matches!(
        DecodeRequest::new(b"").decode_frames(),
        Err(DecodeError::BadArgument(_))
    ));
}

#[test]
fn frameless_gif_is_rejected_at_open() {
    // The engine refuses a stream that ends before any image descriptor, so
    // a frameless GIF never reaches the counting pass.
    let data = gif_bytes(1, 1, &[]);
    assert!(matches!(
        DecodeRequest::new(&data).decode_frames(),
        Err(DecodeError::InvalidHeader(_))
    ));
    assert!(matches!(
        DecodeRequest::new(&data).format(ImageFormat::Gif).decode(),
        Err(DecodeError::InvalidHeader(_))
    ));
}

#[test]
fn forced_non_gif_format_is_rejected() {
    let data = gif_bytes(1, 1, &[frame_at(0, 0, 1, 1, &[1, 2, 3], &[0])]);
    assert!(matches!(
        DecodeRequest::new(&data)
            .format(ImageFormat::Png)
            .decode_frames(),
        Err(DecodeError::BadArgument(_))
    ));
    // Forcing GIF explicitly still decodes.
    let animation = DecodeRequest::new(&data)
        .format(ImageFormat::Gif)
        .decode_frames()
        .unwrap();
    assert_eq!(animation.frame_count(), 1);
}

#[test]
fn truncated_streams_error_cleanly() {
    let first = frame_at(0, 0, 4, 4, &[255, 0, 0], &[0; 16]);
    let second = frame_at(0, 0, 4, 4, &[0, 0, 255], &[0; 16]);
    let data = gif_bytes(4, 4, &[first, second]);

    for cut in [20, data.len() / 2, data.len() - 5] {
        assert!(
            DecodeRequest::new(&data[..cut]).decode_frames().is_err(),
            "cut at {cut} did not error"
        );
    }
}

#[test]
fn limits_bound_frame_count_and_memory() {
    let frames: Vec<gif::Frame<'_>> = (0..3)
        .map(|_| frame_at(0, 0, 2, 2, &[1, 2, 3], &[0; 4]))
        .collect();
    let data = gif_bytes(2, 2, &frames);

    let limits = Limits {
        max_frames: Some(2),
        ..Default::default()
    };
    match DecodeRequest::new(&data)
        .with_limits(&limits)
        .decode_frames()
        .unwrap_err()
    {
        DecodeError::LimitExceeded(_) => {}
        other => panic!("expected LimitExceeded, got {other:?}"),
    }

    // 3 snapshots + canvas + backup at 16 bytes each do not fit in 40.
    let limits = Limits {
        max_memory_bytes: Some(40),
        ..Default::default()
    };
    assert!(matches!(
        DecodeRequest::new(&data).with_limits(&limits).decode_frames(),
        Err(DecodeError::LimitExceeded(_))
    ));
}

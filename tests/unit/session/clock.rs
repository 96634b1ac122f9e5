use super::*;

#[test]
fn frames_become_due_at_their_first_sample() {
    let mut c = MediaClock::new(Fps::default(), 48_000);
    assert_eq!(c.due_frame(), Some(FrameIndex(0)));
    c.advance_frame();
    assert_eq!(c.due_frame(), None);
    assert_eq!(c.pull_span(u64::MAX), (0, 1_600));

    c.advance_to(1_600);
    assert_eq!(c.due_frame(), Some(FrameIndex(1)));
}

#[test]
fn pull_never_passes_the_horizon() {
    let mut c = MediaClock::new(Fps::default(), 48_000);
    c.advance_frame();
    assert_eq!(c.pull_span(1_000), (0, 1_000));
    c.advance_to(1_000);
    assert_eq!(c.due_frame(), None);
    assert_eq!(c.pull_span(1_000), (1_000, 1_000));
    assert_eq!(c.pull_span(5_000), (1_000, 1_600));
}

#[test]
fn ntsc_rate_stays_sample_accurate() {
    let c = MediaClock::new(Fps::new(30_000, 1001).unwrap(), 48_000);
    // 30000 frames at 30000/1001 fps last exactly 1001 s.
    assert_eq!(c.frame_start(30_000), 48_000 * 1001);
}

#[test]
fn driving_a_segment_covers_audio_within_one_frame() {
    let mut c = MediaClock::new(Fps::default(), 48_000);
    let end = 100_123;
    while c.position() < end {
        if c.due_frame().is_some() {
            c.advance_frame();
        }
        let (_, to) = c.pull_span(end);
        c.advance_to(to);
    }
    assert_eq!(c.position(), end);
    let covered = c.frame_start(c.frames());
    assert!(covered >= end);
    assert!(covered - end < 1_600);
}

#[tokio::test(start_paused = true)]
async fn realtime_pacer_spaces_ticks_by_frame_interval() {
    let mut p = Pacer::new(Pacing::Realtime, Fps::default());
    let t0 = tokio::time::Instant::now();
    p.tick().await;
    p.tick().await;
    p.tick().await;
    let elapsed = t0.elapsed();
    assert!(elapsed >= std::time::Duration::from_millis(66));
    assert!(elapsed < std::time::Duration::from_millis(100));
}

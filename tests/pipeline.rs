use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use spline_overlay::display::Display;
use spline_overlay::render::TARGET_COLOR;
use spline_overlay::{
    direction_handler, Direction, Error, Frame, LocalSession, LocalSharedMemory, Message,
    Overlay, Point, RenderLoop, Session, SharedFrameSource, Spline, TargetChannel,
};

const W: u32 = 640;
const H: u32 = 480;

/// Keeps every shown frame and ends the session after `limit` of them.
struct StopAfter {
    session: Arc<LocalSession>,
    shown: Arc<Mutex<Vec<Frame>>>,
    limit: usize,
}

impl Display for StopAfter {
    fn show(&mut self, frame: &Frame) -> Result<(), Error> {
        let mut shown = self.shown.lock().unwrap();
        shown.push(frame.clone());
        if shown.len() >= self.limit {
            self.session.stop();
        }
        Ok(())
    }
}

fn wait_for(mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn frames_from_producer_carry_latest_target() {
    let session = Arc::new(LocalSession::new(111));
    let target = Arc::new(TargetChannel::new());
    session.data_trigger(Direction::ID, direction_handler(Arc::clone(&target)));

    let shm = Arc::new(LocalSharedMemory::new("/cam0", (W * H * 4) as usize));
    let source = SharedFrameSource::new(Arc::clone(&shm), W, H).unwrap();

    // producer: grey frames at its own pace until told to stop
    let done = Arc::new(AtomicBool::new(false));
    let producer = {
        let shm = Arc::clone(&shm);
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let grey = vec![0x40u8; (W * H * 4) as usize];
            while !done.load(Ordering::SeqCst) {
                shm.publish(&grey);
                thread::sleep(Duration::from_millis(2));
            }
        })
    };

    let publisher = session.publisher();
    let aim = Direction { azimuth_angle: 300.0, zenith_angle: 200.0 };
    assert!(publisher.send(Message::Direction(aim)));
    wait_for(|| target.get() == Point::new(300, 200));

    let shown = Arc::new(Mutex::new(Vec::new()));
    let display = StopAfter { session: Arc::clone(&session), shown: Arc::clone(&shown), limit: 5 };
    let overlay = Overlay::new(Spline::reference());
    let mut render_loop = RenderLoop::new(source, Arc::clone(&target), overlay)
        .with_display(Box::new(display));

    let summary = render_loop.run(&*session);
    done.store(true, Ordering::SeqCst);
    producer.join().unwrap();

    assert_eq!(summary.frames, 5);
    assert!(!session.is_running());
    let shown = shown.lock().unwrap();
    assert_eq!(shown.len(), 5);
    for frame in shown.iter() {
        assert_eq!(frame.pixel(300, 200), Some(TARGET_COLOR));
        // untouched background keeps the producer's bytes
        assert_eq!(&frame.as_bytes()[..4], &[0x40; 4]);
    }
}

#[test]
fn invalid_segment_fails_before_the_loop() {
    #[cfg(unix)]
    {
        let shm = spline_overlay::shm::PosixSharedMemory::open("spline-overlay-missing-segment");
        let err = SharedFrameSource::new(shm, W, H).err().unwrap();
        assert!(matches!(
            err,
            Error::SharedMemoryUnavailable { ref name } if name == "/spline-overlay-missing-segment"
        ));
        assert!(err.to_string().contains("spline-overlay-missing-segment"));
    }
}

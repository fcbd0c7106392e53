use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::time;
use vibecheck_lib::{
    Catalog, HapticPrimitive, Pattern, PlaybackController, PlaybackSettings,
    PlaybackSnapshot, STOP_SEQUENCE,
};

#[derive(Default)]
struct Recorder {
    calls: Mutex<Vec<Vec<u32>>>,
}

impl Recorder {
    fn vibration_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|seq| seq.as_slice() != STOP_SEQUENCE)
            .count()
    }

    fn last(&self) -> Option<Vec<u32>> {
        self.calls.lock().unwrap().last().cloned()
    }
}

impl HapticPrimitive for Recorder {
    fn is_available(&self) -> bool {
        true
    }

    fn vibrate(&self, sequence: &[u32]) -> bool {
        assert!(!sequence.is_empty(), "primitive invoked with an empty list");
        self.calls.lock().unwrap().push(sequence.to_vec());
        true
    }
}

fn with_recorder(settings: PlaybackSettings) -> (PlaybackController, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let controller =
        PlaybackController::new(settings.catalog().unwrap(), recorder.clone(), settings).unwrap();
    (controller, recorder)
}

#[tokio::test(start_paused = true)]
async fn every_fixed_pattern_plays_its_literal_durations_first() {
    for pattern in Catalog::builtin().patterns() {
        if pattern.durations.is_empty() {
            continue;
        }
        let (controller, recorder) = with_recorder(PlaybackSettings::default());
        controller.select_pattern(&pattern.id);
        assert!(controller.start());
        assert_eq!(recorder.last().as_ref(), Some(&pattern.durations), "{}", pattern.id);
        controller.stop();
    }
}

#[tokio::test(start_paused = true)]
async fn heartbeat_loop_cycles_at_its_own_rhythm() {
    let (controller, recorder) = with_recorder(PlaybackSettings {
        default_pattern_id: "heartbeat".into(),
        ..PlaybackSettings::default()
    });

    controller.start();
    for cycle in 1..=4 {
        time::sleep(Duration::from_millis(1100)).await;
        time::sleep(Duration::from_millis(1)).await;
        assert_eq!(recorder.vibration_count(), cycle + 1);
        assert_eq!(recorder.last(), Some(vec![100, 100, 100, 800]));
    }

    controller.stop();
    assert_eq!(recorder.last(), Some(STOP_SEQUENCE.to_vec()));
}

#[tokio::test(start_paused = true)]
async fn switching_patterns_requires_an_explicit_restart() {
    let (controller, recorder) = with_recorder(PlaybackSettings::default());

    assert!(controller.toggle());
    controller.select_pattern("pulse-slow");
    assert_eq!(
        controller.snapshot(),
        PlaybackSnapshot {
            is_running: false,
            selected_pattern_id: "pulse-slow".into(),
            is_supported: true,
        }
    );

    time::sleep(Duration::from_secs(30)).await;
    assert_eq!(recorder.vibration_count(), 1);

    assert!(controller.toggle());
    assert_eq!(recorder.last(), Some(vec![500, 500]));
    time::sleep(Duration::from_millis(1001)).await;
    assert_eq!(recorder.vibration_count(), 3);
    controller.teardown();
}

#[tokio::test(start_paused = true)]
async fn independent_controllers_do_not_share_timers() {
    let (first, first_recorder) = with_recorder(PlaybackSettings {
        default_pattern_id: "pulse-fast".into(),
        ..PlaybackSettings::default()
    });
    let (second, second_recorder) = with_recorder(PlaybackSettings {
        default_pattern_id: "pulse-fast".into(),
        ..PlaybackSettings::default()
    });

    first.start();
    second.start();
    second.stop();

    time::sleep(Duration::from_millis(401)).await;
    assert_eq!(first_recorder.vibration_count(), 2);
    assert_eq!(second_recorder.vibration_count(), 1);
    first.stop();
}

#[tokio::test(start_paused = true)]
async fn clones_drive_the_same_loop() {
    let (controller, recorder) = with_recorder(PlaybackSettings::default());
    let handle = controller.clone();

    controller.start();
    assert!(handle.is_running());
    handle.stop();
    assert!(!controller.is_running());

    drop(handle);
    time::sleep(Duration::from_secs(20)).await;
    assert_eq!(recorder.vibration_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn custom_catalog_with_empty_pattern_plays_fallback() {
    let recorder = Arc::new(Recorder::default());
    let catalog = Catalog::new(vec![Pattern::fixed("blank", "Blank", &[], "")]).unwrap();
    let controller = PlaybackController::new(
        catalog,
        recorder.clone(),
        PlaybackSettings {
            fallback_ms: 250,
            ..PlaybackSettings::default()
        },
    )
    .unwrap();

    assert_eq!(controller.selected_pattern_id(), "blank");
    controller.start();
    assert_eq!(recorder.last(), Some(vec![250]));

    time::sleep(Duration::from_millis(251)).await;
    assert_eq!(recorder.vibration_count(), 2);
    controller.stop();
}

//! Orchestrator
//!
//! Owns everything the overlay needs at runtime: the settings store, the
//! phrase library, the activity monitor and the collection of live bubbles.
//! Two timers drive it. The display timer spawns a batch of bubbles and
//! reschedules itself with a freshly jittered interval; the activity timer
//! re-classifies the foreground window every two seconds.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use tokio::runtime::Handle;

use crate::activity::{ActivityMonitor, Category, WindowTitleSource};
use crate::bubble::{
    Bubble, BubbleId, BubbleState, BubbleView, DragTracker, PointerButton, PointerOutcome,
};
use crate::config::{ACTIVITY_REFRESH_PERIOD, FADE_DURATION};
use crate::error::LifecycleError;
use crate::phrases::PhraseLibrary;
use crate::placement::{place, PlacementMode, Point, Rect};
use crate::scheduler::RepeatingTask;
use crate::settings::{Settings, SettingsStore, SubscriptionId};
use crate::surface::{BubbleSurface, Fade};

/// Work area assumed when the monitor cannot be queried
const FALLBACK_WORK_AREA: Rect = Rect::new(0, 0, 1920, 1080);

/// Delay returned by a display tick that outlived its orchestrator
const IDLE_INTERVAL: Duration = Duration::from_secs(3600);

struct LiveBubble {
    bubble: Bubble,
    drag: DragTracker,
}

struct Timers {
    display: RepeatingTask,
    _activity: RepeatingTask,
}

struct Inner {
    settings: SettingsStore,
    surface: Arc<dyn BubbleSurface>,
    phrases: Mutex<Box<dyn PhraseLibrary>>,
    titles: Arc<dyn WindowTitleSource>,
    activity: ActivityMonitor,
    bubbles: Mutex<BTreeMap<BubbleId, LiveBubble>>,
    next_id: AtomicU64,
    runtime: Handle,
    timers: Mutex<Option<Timers>>,
    subscription: Mutex<Option<SubscriptionId>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Shared handle to the running overlay
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    pub fn new(
        settings: SettingsStore,
        surface: Arc<dyn BubbleSurface>,
        phrases: Box<dyn PhraseLibrary>,
        titles: Arc<dyn WindowTitleSource>,
        runtime: Handle,
    ) -> Self {
        let orchestrator = Self {
            inner: Arc::new(Inner {
                settings,
                surface,
                phrases: Mutex::new(phrases),
                titles,
                activity: ActivityMonitor::new(),
                bubbles: Mutex::new(BTreeMap::new()),
                next_id: AtomicU64::new(1),
                runtime,
                timers: Mutex::new(None),
                subscription: Mutex::new(None),
            }),
        };

        let settings = orchestrator.inner.settings.snapshot();
        orchestrator.apply_text_settings(&settings);
        orchestrator
    }

    fn from_weak(weak: &Weak<Inner>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.inner.settings
    }

    pub fn current_category(&self) -> Category {
        self.inner.activity.current()
    }

    /// Start the display and activity timers and follow settings changes
    pub fn start(&self) {
        let mut timers = lock(&self.inner.timers);
        if timers.is_some() {
            tracing::warn!("Orchestrator already started");
            return;
        }

        tracing::info!("Starting overlay timers");
        self.refresh_activity();

        let weak = Arc::downgrade(&self.inner);
        let subscription = self.inner.settings.subscribe(move |settings| {
            if let Some(orchestrator) = Self::from_weak(&weak) {
                orchestrator.on_settings_changed(settings);
            }
        });
        *lock(&self.inner.subscription) = Some(subscription);

        let weak = Arc::downgrade(&self.inner);
        let display = RepeatingTask::spawn(
            &self.inner.runtime,
            "display",
            self.inner.settings.display_interval(),
            move || match Self::from_weak(&weak) {
                Some(orchestrator) => orchestrator.display_tick(),
                None => IDLE_INTERVAL,
            },
        );

        let weak = Arc::downgrade(&self.inner);
        let activity = RepeatingTask::every(
            &self.inner.runtime,
            "activity",
            ACTIVITY_REFRESH_PERIOD,
            move || {
                if let Some(orchestrator) = Self::from_weak(&weak) {
                    orchestrator.refresh_activity();
                }
            },
        );

        *timers = Some(Timers {
            display,
            _activity: activity,
        });
    }

    /// Stop both timers and close every live bubble
    pub fn shutdown(&self) {
        tracing::info!("Shutting down overlay");

        if let Some(timers) = lock(&self.inner.timers).take() {
            timers.display.cancel();
        }
        if let Some(subscription) = lock(&self.inner.subscription).take() {
            self.inner.settings.unsubscribe(subscription);
        }

        let drained: Vec<LiveBubble> = {
            let mut bubbles = lock(&self.inner.bubbles);
            std::mem::take(&mut *bubbles).into_values().collect()
        };

        for mut live in drained {
            if live.bubble.force_close() {
                self.close_surface(live.bubble.id());
            }
        }
    }

    fn on_settings_changed(&self, settings: &Settings) {
        self.apply_text_settings(settings);

        if let Some(timers) = lock(&self.inner.timers).as_ref() {
            timers
                .display
                .reschedule(self.inner.settings.display_interval());
        }
    }

    fn apply_text_settings(&self, settings: &Settings) {
        let mut phrases = lock(&self.inner.phrases);
        if let Err(e) = phrases.set_style(settings.text_style) {
            tracing::error!("Phrase library rejected style {}: {}", settings.text_style, e);
        }
        if let Err(e) = phrases.set_tone(settings.tone) {
            tracing::error!("Phrase library rejected tone {}: {}", settings.tone, e);
        }
    }

    /// Re-classify the foreground window
    pub fn refresh_activity(&self) -> Option<Category> {
        self.inner.activity.refresh(self.inner.titles.as_ref())
    }

    /// Spawn one batch of bubbles and return the delay before the next batch.
    /// Bubbles that fail to open are logged and skipped.
    pub fn display_tick(&self) -> Duration {
        let ids = self.spawn_batch();
        tracing::debug!("Displayed {} bubble(s)", ids.len());
        self.inner.settings.display_interval()
    }

    /// Display a batch right away and restart the display timer
    pub fn display_now(&self) {
        let next = self.display_tick();
        if let Some(timers) = lock(&self.inner.timers).as_ref() {
            timers.display.reschedule(next);
        }
    }

    fn scale_factor(&self) -> f64 {
        match self.inner.surface.scale_factor() {
            Ok(scale) if scale.is_finite() && scale > 0.0 => scale,
            Ok(scale) => {
                tracing::warn!("Ignoring invalid scale factor {}", scale);
                1.0
            }
            Err(e) => {
                tracing::warn!("Failed to query scale factor, assuming 1.0: {}", e);
                1.0
            }
        }
    }

    fn spawn_batch(&self) -> Vec<BubbleId> {
        let count = usize::from(self.inner.settings.message_count());
        let category = self.inner.activity.current();
        let mode = self.inner.settings.placement_mode();

        let texts = lock(&self.inner.phrases).random_texts(count, category);

        let work_area = self.inner.surface.work_area().unwrap_or_else(|e| {
            tracing::warn!("Failed to query work area, assuming 1920x1080: {}", e);
            FALLBACK_WORK_AREA
        });
        let cursor = match mode {
            PlacementMode::FollowMouse => {
                self.inner.surface.cursor_position().unwrap_or_else(|e| {
                    tracing::warn!("Failed to query cursor position: {}", e);
                    work_area.center()
                })
            }
            _ => work_area.center(),
        };
        let scale = self.scale_factor();

        let mut rng = rand::thread_rng();
        let mut ids = Vec::with_capacity(texts.len());

        for text in texts {
            let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
            let mut bubble = Bubble::new(id, text, &mut rng);
            bubble.scale_to(scale);
            bubble.move_to(place(mode, bubble.size(), work_area, cursor, &mut rng));
            let view = bubble.view();
            let hold = bubble.hold();

            // The window asks for its content as soon as it loads
            lock(&self.inner.bubbles).insert(
                id,
                LiveBubble {
                    bubble,
                    drag: DragTracker::default(),
                },
            );

            if let Err(e) = self.inner.surface.open(&view) {
                tracing::error!("Failed to open bubble {}: {}", id, e);
                lock(&self.inner.bubbles).remove(&id);
                continue;
            }

            // Shutdown may have drained the bubble while its window opened
            if let Err(e) = self.step(id, Bubble::show) {
                tracing::warn!("Bubble {} not shown: {}", id, e);
                self.close_surface(id);
                continue;
            }
            if let Err(e) = self.inner.surface.fade(id, Fade::In, FADE_DURATION) {
                tracing::warn!("Failed to fade in bubble {}: {}", id, e);
            }

            self.inner
                .runtime
                .spawn(Self::run_lifecycle(Arc::downgrade(&self.inner), id, hold));
            ids.push(id);
        }

        ids
    }

    async fn run_lifecycle(weak: Weak<Inner>, id: BubbleId, hold: Duration) {
        tokio::time::sleep(FADE_DURATION).await;
        let Some(this) = Self::from_weak(&weak) else {
            return;
        };
        if this.step(id, Bubble::finish_fade_in).is_err() {
            return;
        }
        drop(this);

        tokio::time::sleep(hold).await;
        let Some(this) = Self::from_weak(&weak) else {
            return;
        };
        if this.step(id, Bubble::finish_hold).is_err() {
            return;
        }
        if let Err(e) = this.inner.surface.fade(id, Fade::Out, FADE_DURATION) {
            tracing::warn!("Failed to fade out bubble {}: {}", id, e);
        }
        drop(this);

        tokio::time::sleep(FADE_DURATION).await;
        if let Some(this) = Self::from_weak(&weak) {
            this.finish(id);
        }
    }

    fn step(
        &self,
        id: BubbleId,
        transition: fn(&mut Bubble) -> Result<(), LifecycleError>,
    ) -> Result<(), LifecycleError> {
        let mut bubbles = lock(&self.inner.bubbles);
        let live = bubbles.get_mut(&id).ok_or(LifecycleError::NotFound(id))?;
        transition(&mut live.bubble)
    }

    /// Fade-out complete: drop the bubble from the live set and destroy it
    fn finish(&self, id: BubbleId) {
        let removed = lock(&self.inner.bubbles).remove(&id);

        let Some(mut live) = removed else {
            return;
        };
        match live.bubble.finish_fade_out() {
            Ok(()) => self.close_surface(id),
            Err(e) => tracing::error!("{}", e),
        }
    }

    fn close_surface(&self, id: BubbleId) {
        if let Err(e) = self.inner.surface.close(id) {
            tracing::error!("Failed to close bubble {}: {}", id, e);
        }
    }

    pub fn live_count(&self) -> usize {
        lock(&self.inner.bubbles).len()
    }

    pub fn live_bubbles(&self) -> Vec<BubbleView> {
        lock(&self.inner.bubbles)
            .values()
            .map(|live| live.bubble.view())
            .collect()
    }

    pub fn bubble(&self, id: BubbleId) -> Option<BubbleView> {
        lock(&self.inner.bubbles)
            .get(&id)
            .map(|live| live.bubble.view())
    }

    pub fn bubble_state(&self, id: BubbleId) -> Option<BubbleState> {
        lock(&self.inner.bubbles)
            .get(&id)
            .map(|live| live.bubble.state())
    }

    pub fn pointer_pressed(
        &self,
        id: BubbleId,
        button: PointerButton,
        pointer: Point,
    ) -> PointerOutcome {
        let mut bubbles = lock(&self.inner.bubbles);
        match bubbles.get_mut(&id) {
            Some(live) => {
                let window = live.bubble.position();
                live.drag.press(button, pointer, window)
            }
            None => PointerOutcome::Ignored,
        }
    }

    /// Drag a bubble. In fixed-position mode the new spot becomes the fixed point.
    pub fn pointer_moved(&self, id: BubbleId, pointer: Point) -> PointerOutcome {
        let outcome = {
            let mut bubbles = lock(&self.inner.bubbles);
            let Some(live) = bubbles.get_mut(&id) else {
                return PointerOutcome::Ignored;
            };
            let outcome = live.drag.moved(pointer);
            if let PointerOutcome::Moved(position) = outcome {
                live.bubble.move_to(position);
            }
            outcome
        };

        if let PointerOutcome::Moved(position) = outcome {
            if let Err(e) = self.inner.surface.move_to(id, position) {
                tracing::warn!("Failed to move bubble {}: {}", id, e);
            }
            if self.inner.settings.fixed_position() {
                self.inner.settings.set_position(position);
            }
        }

        outcome
    }

    pub fn pointer_released(&self, id: BubbleId, button: PointerButton) -> PointerOutcome {
        lock(&self.inner.bubbles)
            .get_mut(&id)
            .map(|live| live.drag.release(button))
            .unwrap_or(PointerOutcome::Ignored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::UNKNOWN_WINDOW_TITLE;
    use crate::bubble::estimate_size;
    use crate::error::{CoreError, Result};
    use crate::phrases::FallbackPhrases;
    use crate::settings::{TextStyle, Tone};
    use std::sync::atomic::AtomicBool;
    use tokio::time::sleep;

    const SCREEN: Rect = Rect::new(0, 0, 1600, 900);
    const CURSOR: Point = Point::new(800, 450);

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Open(BubbleId, Point),
        Fade(BubbleId, Fade),
        Move(BubbleId, Point),
        Close(BubbleId),
    }

    struct RecordingSurface {
        calls: Mutex<Vec<Call>>,
        fail_open: AtomicBool,
        scale: Mutex<f64>,
    }

    impl Default for RecordingSurface {
        fn default() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_open: AtomicBool::new(false),
                scale: Mutex::new(1.0),
            }
        }
    }

    impl RecordingSurface {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn opened(&self) -> Vec<(BubbleId, Point)> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Open(id, at) => Some((id, at)),
                    _ => None,
                })
                .collect()
        }

        fn close_count(&self, id: BubbleId) -> usize {
            self.calls()
                .iter()
                .filter(|c| **c == Call::Close(id))
                .count()
        }
    }

    impl BubbleSurface for RecordingSurface {
        fn work_area(&self) -> Result<Rect> {
            Ok(SCREEN)
        }

        fn cursor_position(&self) -> Result<Point> {
            Ok(CURSOR)
        }

        fn scale_factor(&self) -> Result<f64> {
            Ok(*self.scale.lock().unwrap())
        }

        fn open(&self, bubble: &BubbleView) -> Result<()> {
            if self.fail_open.load(Ordering::SeqCst) {
                return Err(CoreError::Surface("window creation failed".to_string()));
            }
            self.calls
                .lock()
                .unwrap()
                .push(Call::Open(bubble.id, bubble.position));
            Ok(())
        }

        fn fade(&self, id: BubbleId, fade: Fade, _duration: Duration) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Fade(id, fade));
            Ok(())
        }

        fn move_to(&self, id: BubbleId, position: Point) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Move(id, position));
            Ok(())
        }

        fn close(&self, id: BubbleId) -> Result<()> {
            self.calls.lock().unwrap().push(Call::Close(id));
            Ok(())
        }
    }

    /// Looks the bubble up while its window opens, as the bubble page does
    #[derive(Default)]
    struct LoadingSurface {
        owner: Mutex<Weak<Inner>>,
        loaded: Mutex<Vec<Option<BubbleView>>>,
    }

    impl BubbleSurface for LoadingSurface {
        fn work_area(&self) -> Result<Rect> {
            Ok(SCREEN)
        }

        fn cursor_position(&self) -> Result<Point> {
            Ok(CURSOR)
        }

        fn open(&self, bubble: &BubbleView) -> Result<()> {
            let owner = self.owner.lock().unwrap().clone();
            let loaded = Orchestrator::from_weak(&owner).and_then(|o| o.bubble(bubble.id));
            self.loaded.lock().unwrap().push(loaded);
            Ok(())
        }

        fn fade(&self, _id: BubbleId, _fade: Fade, _duration: Duration) -> Result<()> {
            Ok(())
        }

        fn move_to(&self, _id: BubbleId, _position: Point) -> Result<()> {
            Ok(())
        }

        fn close(&self, _id: BubbleId) -> Result<()> {
            Ok(())
        }
    }

    struct FixedTitle(Mutex<String>);

    impl WindowTitleSource for FixedTitle {
        fn active_window_title(&self) -> Result<String> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    /// Records the category and style of every request
    #[derive(Clone, Default)]
    struct RecordingPhrases {
        requests: Arc<Mutex<Vec<(usize, Category)>>>,
        style: Arc<Mutex<Option<TextStyle>>>,
    }

    impl PhraseLibrary for RecordingPhrases {
        fn set_style(&mut self, style: TextStyle) -> Result<()> {
            *self.style.lock().unwrap() = Some(style);
            Ok(())
        }

        fn set_tone(&mut self, _tone: Tone) -> Result<()> {
            Ok(())
        }

        fn random_texts(&mut self, count: usize, category: Category) -> Vec<String> {
            self.requests.lock().unwrap().push((count, category));
            vec!["hello".to_string(); count]
        }
    }

    fn create_test_orchestrator(
        title: &str,
    ) -> (Orchestrator, Arc<RecordingSurface>, RecordingPhrases) {
        let surface = Arc::new(RecordingSurface::default());
        let phrases = RecordingPhrases::default();
        let orchestrator = Orchestrator::new(
            SettingsStore::default(),
            surface.clone(),
            Box::new(phrases.clone()),
            Arc::new(FixedTitle(Mutex::new(title.to_string()))),
            Handle::current(),
        );
        (orchestrator, surface, phrases)
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_spawns_message_count_bubbles() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        orchestrator.settings().set_message_count(3).unwrap();

        orchestrator.display_tick();

        assert_eq!(surface.opened().len(), 3);
        assert_eq!(orchestrator.live_count(), 3);
        for view in orchestrator.live_bubbles() {
            assert_eq!(view.state, BubbleState::Showing);
            assert!(SCREEN.contains_box(view.position, view.size));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_places_each_bubble_by_mode() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        orchestrator.settings().set_message_count(3).unwrap();
        orchestrator.settings().set_fixed_position(true);
        orchestrator.settings().set_position(Point::new(42, 24));

        orchestrator.display_tick();
        assert!(surface
            .opened()
            .iter()
            .all(|(_, at)| *at == Point::new(42, 24)));

        orchestrator.settings().set_fixed_position(false);
        orchestrator.settings().set_mouse_following(true);
        orchestrator.display_tick();

        let followed: Vec<BubbleView> = orchestrator
            .live_bubbles()
            .into_iter()
            .filter(|v| v.position != Point::new(42, 24))
            .collect();
        assert_eq!(followed.len(), 3);
        for view in followed {
            let w = view.size.width as i32;
            let h = view.size.height as i32;
            let candidates = [
                Point::new(CURSOR.x - w / 2, CURSOR.y - h - 30),
                Point::new(CURSOR.x - w / 2, CURSOR.y + 30),
                Point::new(CURSOR.x - w - 30, CURSOR.y - h / 2),
                Point::new(CURSOR.x + 30, CURSOR.y - h / 2),
            ];
            assert!(candidates.contains(&view.position));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_scaled_display_keeps_random_bubbles_on_screen() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        *surface.scale.lock().unwrap() = 1.5;
        orchestrator.settings().set_message_count(5).unwrap();
        orchestrator.settings().set_edge_adsorption(true);

        for _ in 0..100 {
            orchestrator.display_tick();
        }

        let physical = estimate_size("hello").scaled(1.5);
        let views = orchestrator.live_bubbles();
        assert_eq!(views.len(), 500);

        let mut flush_right = 0;
        for view in &views {
            assert_eq!(view.size, physical);
            assert!(
                SCREEN.contains_box(view.position, view.size),
                "bubble at {:?} leaves the work area",
                view.position
            );
            if view.position.x + view.size.width as i32 == SCREEN.right() {
                flush_right += 1;
            }
        }
        assert!(flush_right > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scaled_display_centres_follow_mouse_on_physical_size() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        *surface.scale.lock().unwrap() = 2.0;
        orchestrator.settings().set_mouse_following(true);

        orchestrator.display_tick();

        for view in orchestrator.live_bubbles() {
            let w = view.size.width as i32;
            let h = view.size.height as i32;
            let centred_x = view.position.x + w / 2 == CURSOR.x;
            let centred_y = view.position.y + h / 2 == CURSOR.y;
            assert!(centred_x || centred_y, "{:?} not centred on the cursor", view);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_bubble_is_live_while_its_window_opens() {
        let surface = Arc::new(LoadingSurface::default());
        let orchestrator = Orchestrator::new(
            SettingsStore::default(),
            surface.clone(),
            Box::new(RecordingPhrases::default()),
            Arc::new(FixedTitle(Mutex::new(UNKNOWN_WINDOW_TITLE.to_string()))),
            Handle::current(),
        );
        *surface.owner.lock().unwrap() = Arc::downgrade(&orchestrator.inner);

        orchestrator.display_tick();

        let loaded = surface.loaded.lock().unwrap().clone();
        assert_eq!(loaded.len(), 2);
        for view in loaded {
            let view = view.expect("bubble missing while its window opened");
            assert_eq!(view.state, BubbleState::Created);
            assert_eq!(view.text, "hello");
        }
        assert_eq!(orchestrator.live_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_bubble_lifecycle_and_single_removal() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        orchestrator.settings().set_message_count(1).unwrap();

        orchestrator.display_tick();
        let view = orchestrator.live_bubbles().remove(0);
        let id = view.id;
        let hold = Duration::from_millis(view.hold_ms);
        assert_eq!(orchestrator.bubble_state(id), Some(BubbleState::Showing));
        assert!(surface.calls().contains(&Call::Fade(id, Fade::In)));

        sleep(FADE_DURATION + Duration::from_millis(10)).await;
        assert_eq!(orchestrator.bubble_state(id), Some(BubbleState::Held));

        sleep(hold).await;
        assert_eq!(orchestrator.bubble_state(id), Some(BubbleState::FadingOut));
        assert!(surface.calls().contains(&Call::Fade(id, Fade::Out)));
        assert_eq!(surface.close_count(id), 0);

        sleep(FADE_DURATION).await;
        assert_eq!(orchestrator.bubble_state(id), None);
        assert_eq!(orchestrator.live_count(), 0);
        assert_eq!(surface.close_count(id), 1);

        sleep(Duration::from_secs(30)).await;
        assert_eq!(surface.close_count(id), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_open_skips_bubble_and_keeps_going() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        surface.fail_open.store(true, Ordering::SeqCst);

        let next = orchestrator.display_tick();
        assert_eq!(orchestrator.live_count(), 0);
        assert!(next > Duration::ZERO);

        surface.fail_open.store(false, Ordering::SeqCst);
        orchestrator.display_tick();
        assert_eq!(orchestrator.live_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_uses_current_category() {
        let (orchestrator, _, phrases) = create_test_orchestrator("Visual Studio Code - main.rs");

        orchestrator.refresh_activity();
        orchestrator.display_tick();

        assert_eq!(
            phrases.requests.lock().unwrap().last(),
            Some(&(2, Category::Coding))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_timer_refreshes_category() {
        let surface = Arc::new(RecordingSurface::default());
        let title = Arc::new(FixedTitle(Mutex::new("Notepad".to_string())));
        let orchestrator = Orchestrator::new(
            SettingsStore::default(),
            surface,
            Box::new(FallbackPhrases::default()),
            title.clone(),
            Handle::current(),
        );
        orchestrator.settings().set_presence(0).unwrap();
        orchestrator.start();
        assert_eq!(orchestrator.current_category(), Category::General);

        *title.0.lock().unwrap() = "Spotify".to_string();
        sleep(Duration::from_millis(2_100)).await;
        assert_eq!(orchestrator.current_category(), Category::Music);

        orchestrator.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_presence_change_reschedules_pending_tick() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        orchestrator.settings().set_presence(0).unwrap();
        orchestrator.start();

        sleep(Duration::from_secs(10)).await;
        assert!(surface.opened().is_empty());

        orchestrator.settings().set_presence(100).unwrap();
        sleep(Duration::from_millis(6_100)).await;
        assert!(!surface.opened().is_empty());

        orchestrator.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_style_change_reaches_phrase_library() {
        let (orchestrator, _, phrases) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        assert_eq!(*phrases.style.lock().unwrap(), Some(TextStyle::Funny));

        orchestrator.start();
        orchestrator.settings().set_text_style(TextStyle::Clever);
        assert_eq!(*phrases.style.lock().unwrap(), Some(TextStyle::Clever));

        orchestrator.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_every_bubble_once() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        orchestrator.settings().set_message_count(4).unwrap();
        orchestrator.start();
        orchestrator.display_tick();
        let ids: Vec<BubbleId> = surface.opened().into_iter().map(|(id, _)| id).collect();

        orchestrator.shutdown();
        assert_eq!(orchestrator.live_count(), 0);

        sleep(Duration::from_secs(300)).await;
        for id in ids {
            assert_eq!(surface.close_count(id), 1);
        }
        assert!(surface.opened().len() == 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_in_fixed_mode_adopts_position() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        orchestrator.settings().set_message_count(1).unwrap();
        orchestrator.settings().set_fixed_position(true);
        orchestrator.display_tick();
        let id = surface.opened()[0].0;

        assert_eq!(
            orchestrator.pointer_pressed(id, PointerButton::Primary, Point::new(110, 110)),
            PointerOutcome::DragStarted
        );
        assert_eq!(
            orchestrator.pointer_moved(id, Point::new(510, 310)),
            PointerOutcome::Moved(Point::new(500, 300))
        );
        assert_eq!(
            orchestrator.pointer_released(id, PointerButton::Primary),
            PointerOutcome::DragEnded
        );

        assert!(surface
            .calls()
            .contains(&Call::Move(id, Point::new(500, 300))));
        assert_eq!(orchestrator.settings().position(), Point::new(500, 300));
        assert_eq!(
            orchestrator.bubble(id).map(|v| v.position),
            Some(Point::new(500, 300))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_drag_outside_fixed_mode_keeps_fixed_point() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        orchestrator.settings().set_message_count(1).unwrap();
        orchestrator.display_tick();
        let (id, at) = surface.opened()[0];

        orchestrator.pointer_pressed(id, PointerButton::Primary, at);
        orchestrator.pointer_moved(id, at.offset(5, 5));

        assert_eq!(orchestrator.settings().position(), Point::new(100, 100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_right_click_requests_menu() {
        let (orchestrator, surface, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);
        orchestrator.display_tick();
        let id = surface.opened()[0].0;

        assert_eq!(
            orchestrator.pointer_pressed(id, PointerButton::Secondary, Point::new(7, 8)),
            PointerOutcome::ContextMenu(Point::new(7, 8))
        );
        assert_eq!(
            orchestrator.pointer_moved(id, Point::new(50, 50)),
            PointerOutcome::Ignored
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_pointer_on_unknown_bubble_ignored() {
        let (orchestrator, _, _) = create_test_orchestrator(UNKNOWN_WINDOW_TITLE);

        assert_eq!(
            orchestrator.pointer_pressed(999, PointerButton::Primary, Point::new(0, 0)),
            PointerOutcome::Ignored
        );
    }
}

//! Page-transition orchestration
//!
//! Each navigation runs one cycle: `Loading` while the destination's fonts
//! and images preload (and for at least the configured minimum), then
//! `FadingIn` while the content is revealed, then back to `Idle`. A new
//! navigation aborts the cycle in flight and starts over from `Loading`.

mod probe;

pub use probe::{AssetProbe, FsAssetProbe};

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};

use crate::config::TransitionConfig;

/// Where a navigation cycle is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransitionState {
    Idle,
    Loading,
    FadingIn,
}

/// Snapshot published to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionStatus {
    /// Navigation counter, 0 before the first navigation
    pub cycle: u64,
    pub path: String,
    pub state: TransitionState,
}

/// Assets a route needs before it is revealed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouteAssets {
    pub fonts: Vec<String>,
    pub images: Vec<String>,
}

/// Outcome of one preload group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreloadReport {
    pub loaded: usize,
    pub failed: usize,
}

/// Drives navigation cycles for one client
pub struct Orchestrator<P> {
    config: TransitionConfig,
    probe: Arc<P>,
    status: Arc<watch::Sender<TransitionStatus>>,
    /// Last cycle number handed out
    cycle: u64,
    /// Bumped by every navigation and cancel; a cycle only publishes while
    /// it still holds the current generation
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl<P: AssetProbe> Orchestrator<P> {
    pub fn new(config: TransitionConfig, probe: Arc<P>) -> Self {
        let (status, _) = watch::channel(TransitionStatus {
            cycle: 0,
            path: String::new(),
            state: TransitionState::Idle,
        });
        Self {
            config,
            probe,
            status: Arc::new(status),
            cycle: 0,
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<TransitionStatus> {
        self.status.subscribe()
    }

    pub fn status(&self) -> TransitionStatus {
        self.status.borrow().clone()
    }

    /// Start a cycle for `path`, superseding any cycle in flight.
    ///
    /// `Loading` is published before this returns. Must be called inside a
    /// tokio runtime.
    pub fn navigate(&mut self, path: &str, assets: RouteAssets) -> u64 {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        self.cycle += 1;
        let cycle = self.cycle;
        let mut generation = 0;
        // Bumped under the watch lock so a stale cycle cannot publish after it
        self.status.send_modify(|status| {
            generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
            *status = TransitionStatus {
                cycle,
                path: path.to_string(),
                state: TransitionState::Loading,
            };
        });
        tracing::debug!("Transition {} to {} started", cycle, path);

        let run = Cycle {
            id: cycle,
            generation,
            path: path.to_string(),
            config: self.config.clone(),
            probe: self.probe.clone(),
            status: self.status.clone(),
            current: self.generation.clone(),
        };
        self.task = Some(tokio::spawn(run.run(assets)));
        cycle
    }

    /// Drop any cycle in flight and go back to `Idle`
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        // Invalidate the aborted cycle in case it is mid-publish
        self.status.send_modify(|status| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            status.state = TransitionState::Idle;
        });
    }
}

impl<P> Drop for Orchestrator<P> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// One navigation cycle, owned by its task
struct Cycle<P> {
    id: u64,
    generation: u64,
    path: String,
    config: TransitionConfig,
    probe: Arc<P>,
    status: Arc<watch::Sender<TransitionStatus>>,
    current: Arc<AtomicU64>,
}

impl<P: AssetProbe> Cycle<P> {
    async fn run(self, assets: RouteAssets) {
        let floor = tokio::time::sleep(self.config.min_display());
        let preload = async {
            tokio::join!(
                preload(self.probe.clone(), assets.fonts, "font"),
                preload(self.probe.clone(), assets.images, "image"),
            )
        };
        let (_, (fonts, images)) = tokio::join!(floor, preload);
        tracing::debug!(
            "Transition {} preloaded fonts {:?} images {:?}",
            self.id,
            fonts,
            images
        );

        if !self.publish(TransitionState::FadingIn) {
            return;
        }
        tokio::time::sleep(self.config.settle_delay()).await;
        tokio::time::sleep(self.config.fade_duration()).await;
        self.publish(TransitionState::Idle);
    }

    /// Publish unless a newer navigation took over; returns whether it did
    fn publish(&self, state: TransitionState) -> bool {
        let published = self.status.send_if_modified(|status| {
            if self.current.load(Ordering::SeqCst) != self.generation {
                return false;
            }
            *status = TransitionStatus {
                cycle: self.id,
                path: self.path.clone(),
                state,
            };
            true
        });
        if !published {
            tracing::debug!("Ignoring stale transition {} ({:?})", self.id, state);
        }
        published
    }
}

/// Load every asset concurrently; failures are logged and count as done
pub async fn preload<P: AssetProbe>(probe: Arc<P>, assets: Vec<String>, kind: &str) -> PreloadReport {
    let mut set = JoinSet::new();
    for asset in assets {
        let probe = probe.clone();
        set.spawn(async move {
            let result = probe.load(&asset).await;
            (asset, result)
        });
    }

    let mut report = PreloadReport::default();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(()))) => report.loaded += 1,
            Ok((asset, Err(e))) => {
                tracing::warn!("Failed to preload {} {}: {}", kind, asset, e);
                report.failed += 1;
            }
            Err(e) => {
                tracing::warn!("Preload task for {} panicked or was cancelled: {}", kind, e);
                report.failed += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::collections::HashMap;
    use std::future::Future;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Probe with a fixed delay and outcome per asset
    #[derive(Default)]
    struct ScriptedProbe {
        script: HashMap<String, (Duration, bool)>,
    }

    impl ScriptedProbe {
        fn with(mut self, asset: &str, delay_ms: u64, ok: bool) -> Self {
            self.script
                .insert(asset.to_string(), (Duration::from_millis(delay_ms), ok));
            self
        }
    }

    impl AssetProbe for ScriptedProbe {
        fn load(&self, asset: &str) -> impl Future<Output = Result<()>> + Send {
            let (delay, ok) = self
                .script
                .get(asset)
                .copied()
                .unwrap_or((Duration::ZERO, true));
            let asset = asset.to_string();
            async move {
                tokio::time::sleep(delay).await;
                if ok {
                    Ok(())
                } else {
                    anyhow::bail!("{} is broken", asset)
                }
            }
        }
    }

    fn config() -> TransitionConfig {
        TransitionConfig {
            min_display_ms: 800,
            settle_delay_ms: 100,
            fade_duration_ms: 600,
            fonts: Vec::new(),
        }
    }

    fn assets(images: &[&str]) -> RouteAssets {
        RouteAssets {
            fonts: vec!["fonts/body.woff2".to_string()],
            images: images.iter().map(|s| s.to_string()).collect(),
        }
    }

    async fn wait_for(
        rx: &mut watch::Receiver<TransitionStatus>,
        state: TransitionState,
    ) -> TransitionStatus {
        rx.wait_for(|s| s.state == state).await.unwrap().clone()
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_lasts_at_least_min_display() {
        let mut orchestrator = Orchestrator::new(config(), Arc::new(ScriptedProbe::default()));
        let mut rx = orchestrator.subscribe();
        let start = Instant::now();

        let cycle = orchestrator.navigate("/about/", assets(&["/a.jpg"]));
        assert_eq!(cycle, 1);
        assert_eq!(orchestrator.status().state, TransitionState::Loading);

        wait_for(&mut rx, TransitionState::FadingIn).await;
        assert!(start.elapsed() >= Duration::from_millis(800));
        assert!(start.elapsed() < Duration::from_millis(900));

        let done = wait_for(&mut rx, TransitionState::Idle).await;
        assert_eq!(done.path, "/about/");
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_assets_extend_loading() {
        let probe = ScriptedProbe::default().with("/big.jpg", 2000, true);
        let mut orchestrator = Orchestrator::new(config(), Arc::new(probe));
        let mut rx = orchestrator.subscribe();
        let start = Instant::now();

        orchestrator.navigate("/gallery/", assets(&["/big.jpg", "/small.jpg"]));
        wait_for(&mut rx, TransitionState::FadingIn).await;
        assert!(start.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_assets_do_not_block() {
        let probe = ScriptedProbe::default()
            .with("/broken.jpg", 50, false)
            .with("fonts/body.woff2", 10, false);
        let mut orchestrator = Orchestrator::new(config(), Arc::new(probe));
        let mut rx = orchestrator.subscribe();

        orchestrator.navigate("/blog/post/", assets(&["/broken.jpg"]));
        let done = wait_for(&mut rx, TransitionState::Idle).await;
        assert_eq!(done.cycle, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_navigation_supersedes_old_cycle() {
        let probe = ScriptedProbe::default().with("/slow.jpg", 5000, true);
        let mut orchestrator = Orchestrator::new(config(), Arc::new(probe));
        let mut rx = orchestrator.subscribe();

        orchestrator.navigate("/projects/", assets(&["/slow.jpg"]));
        tokio::time::sleep(Duration::from_millis(100)).await;

        let start = Instant::now();
        let cycle = orchestrator.navigate("/journal/", assets(&[]));
        assert_eq!(cycle, 2);
        let status = orchestrator.status();
        assert_eq!(status.path, "/journal/");
        assert_eq!(status.state, TransitionState::Loading);

        // The new cycle restarts its own minimum display
        let fading = wait_for(&mut rx, TransitionState::FadingIn).await;
        assert_eq!(fading.path, "/journal/");
        assert!(start.elapsed() >= Duration::from_millis(800));

        let idle = wait_for(&mut rx, TransitionState::Idle).await;
        assert_eq!(idle.cycle, 2);

        // Nothing from the first cycle shows up later
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(orchestrator.status(), idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_returns_to_idle() {
        let mut orchestrator = Orchestrator::new(config(), Arc::new(ScriptedProbe::default()));
        orchestrator.navigate("/contact/", assets(&[]));
        orchestrator.cancel();
        assert_eq!(orchestrator.status().state, TransitionState::Idle);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(orchestrator.status().state, TransitionState::Idle);
        assert_eq!(orchestrator.status().path, "/contact/");
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_numbers_stay_contiguous_after_cancel() {
        let mut orchestrator = Orchestrator::new(config(), Arc::new(ScriptedProbe::default()));
        let mut rx = orchestrator.subscribe();

        assert_eq!(orchestrator.navigate("/about/", assets(&[])), 1);
        orchestrator.cancel();
        assert_eq!(orchestrator.navigate("/gallery/", assets(&[])), 2);

        let done = wait_for(&mut rx, TransitionState::Idle).await;
        assert_eq!(done.cycle, 2);
        assert_eq!(done.path, "/gallery/");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_superseded_cycles_never_publish_last() {
        let mut config = config();
        config.min_display_ms = 0;
        config.settle_delay_ms = 0;
        config.fade_duration_ms = 0;

        for _ in 0..200 {
            let mut orchestrator =
                Orchestrator::new(config.clone(), Arc::new(ScriptedProbe::default()));
            let mut rx = orchestrator.subscribe();
            orchestrator.navigate("/old/", assets(&[]));
            tokio::task::yield_now().await;
            let cycle = orchestrator.navigate("/new/", assets(&[]));

            let done = wait_for(&mut rx, TransitionState::Idle).await;
            assert_eq!(done.cycle, cycle);
            assert_eq!(orchestrator.status().path, "/new/");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_preload_report() {
        let probe = Arc::new(
            ScriptedProbe::default()
                .with("/a.jpg", 10, true)
                .with("/b.jpg", 10, false),
        );
        let report = preload(
            probe,
            vec!["/a.jpg".to_string(), "/b.jpg".to_string(), "/c.jpg".to_string()],
            "image",
        )
        .await;
        assert_eq!(report, PreloadReport { loaded: 2, failed: 1 });
    }
}

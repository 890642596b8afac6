//! Headless Chrome renderer.
//!
//! Each render runs in its own browser process with a throwaway profile
//! directory. The number of live processes is capped by `RenderSlots`; callers
//! beyond capacity wait up to the queue timeout and are then rejected with
//! `RenderError::Busy`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::{EventLifecycleEvent, PrintToPdfParams};
use futures::{Stream, StreamExt};
use tempfile::TempDir;
use tokio::sync::{Semaphore, SemaphorePermit};
use tokio::task::JoinHandle;
use tokio::time::{timeout, timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::render::{DocumentRenderer, RenderError};

const MM_PER_INCH: f64 = 25.4;
const A4_WIDTH_MM: f64 = 210.0;
const A4_HEIGHT_MM: f64 = 297.0;
const PAGE_MARGIN_MM: f64 = 25.0;
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);
const NETWORK_IDLE_TIMEOUT: Duration = Duration::from_secs(10);
const LIFECYCLE_INIT: &str = "init";
const LIFECYCLE_NETWORK_IDLE: &str = "networkIdle";

#[derive(Debug, Clone, Default)]
pub struct BrowserSettings {
    /// Chrome/Chromium binary; `None` lets chromiumoxide locate one.
    pub executable: Option<PathBuf>,
    /// Disables the Chrome sandbox. Needed in most containers.
    pub no_sandbox: bool,
}

/// Print options: A4, 25mm on every side, backgrounds on, no header/footer.
pub fn a4_print_params() -> PrintToPdfParams {
    let margin = PAGE_MARGIN_MM / MM_PER_INCH;
    PrintToPdfParams {
        paper_width: Some(A4_WIDTH_MM / MM_PER_INCH),
        paper_height: Some(A4_HEIGHT_MM / MM_PER_INCH),
        margin_top: Some(margin),
        margin_bottom: Some(margin),
        margin_left: Some(margin),
        margin_right: Some(margin),
        print_background: Some(true),
        display_header_footer: Some(false),
        ..Default::default()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Admission control
// ────────────────────────────────────────────────────────────────────────────

/// Bounded set of render slots, one per concurrently running browser.
pub struct RenderSlots {
    semaphore: Semaphore,
    capacity: usize,
    queue_timeout: Duration,
}

impl RenderSlots {
    pub fn new(capacity: usize, queue_timeout: Duration) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Semaphore::new(capacity),
            capacity,
            queue_timeout,
        }
    }

    /// Waits for a free slot until the queue timeout or `deadline`, whichever
    /// comes first.
    pub async fn acquire(&self, deadline: Instant) -> Result<SemaphorePermit<'_>, RenderError> {
        let queue_deadline = (Instant::now() + self.queue_timeout).min(deadline);
        match timeout_at(queue_deadline, self.semaphore.acquire()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_closed)) => Err(RenderError::Launch("render pool closed".to_string())),
            Err(_) if queue_deadline == deadline => Err(RenderError::TimedOut),
            Err(_) => Err(RenderError::Busy {
                capacity: self.capacity,
                retry_after: self.queue_timeout,
            }),
        }
    }

    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Browser seam
// ────────────────────────────────────────────────────────────────────────────

/// Starts one browser per render.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    type Session: PrintSession;

    async fn launch(&self) -> Result<Self::Session, RenderError>;
}

/// A running browser. Prints one document, then must be closed.
#[async_trait]
pub trait PrintSession: Send + Sync + Sized {
    async fn print(&self, html: &str) -> Result<Bytes, RenderError>;

    async fn close(self);
}

/// Waits until the content loaded by `setContent` reports `networkIdle`.
/// Lifecycle events before the document's `init` belong to `about:blank`.
async fn wait_for_network_idle<S>(events: S) -> bool
where
    S: Stream<Item = String>,
{
    futures::pin_mut!(events);
    let mut initialized = false;
    while let Some(name) = events.next().await {
        match name.as_str() {
            LIFECYCLE_INIT => initialized = true,
            LIFECYCLE_NETWORK_IDLE if initialized => return true,
            _ => {}
        }
    }
    false
}

// ────────────────────────────────────────────────────────────────────────────
// Chrome
// ────────────────────────────────────────────────────────────────────────────

pub struct ChromeLauncher {
    settings: BrowserSettings,
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    type Session = BrowserSession;

    async fn launch(&self) -> Result<BrowserSession, RenderError> {
        BrowserSession::launch(&self.settings).await
    }
}

/// One launched browser process. `close` tears it down; if the owning future
/// is cancelled first, `Drop` stops the event loop and dropping `Browser`
/// kills the child process.
pub struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
    profile_dir: TempDir,
}

impl BrowserSession {
    async fn launch(settings: &BrowserSettings) -> Result<Self, RenderError> {
        let profile_dir = tempfile::Builder::new()
            .prefix("bidwright-chrome-")
            .tempdir()
            .map_err(|e| RenderError::Launch(format!("profile dir: {e}")))?;

        let mut builder = BrowserConfig::builder().user_data_dir(profile_dir.path());
        if settings.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(executable) = &settings.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(RenderError::Launch)?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    debug!("Browser event loop stopped: {e}");
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler,
            profile_dir,
        })
    }
}

#[async_trait]
impl PrintSession for BrowserSession {
    async fn print(&self, html: &str) -> Result<Bytes, RenderError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Load(e.to_string()))?;

        let lifecycle = page
            .event_listener::<EventLifecycleEvent>()
            .await
            .map_err(|e| RenderError::Load(e.to_string()))?;

        // Returns once the document has loaded.
        page.set_content(html)
            .await
            .map_err(|e| RenderError::Load(e.to_string()))?;

        let idle = wait_for_network_idle(lifecycle.map(|event| event.name.clone()));
        if timeout(NETWORK_IDLE_TIMEOUT, idle).await.is_err() {
            warn!("No networkIdle within {NETWORK_IDLE_TIMEOUT:?}; printing loaded document");
        }

        let pdf = page
            .pdf(a4_print_params())
            .await
            .map_err(|e| RenderError::Print(e.to_string()))?;

        Ok(Bytes::from(pdf))
    }

    async fn close(mut self) {
        let shutdown = async {
            if let Err(e) = self.browser.close().await {
                warn!("Browser close failed: {e}");
            }
            if let Err(e) = self.browser.wait().await {
                warn!("Waiting for browser exit failed: {e}");
            }
        };
        if timeout(CLOSE_TIMEOUT, shutdown).await.is_err() {
            warn!("Browser did not exit within {CLOSE_TIMEOUT:?}; killing it");
        }
        self.handler.abort();
        debug!("Browser closed, removing {}", self.profile_dir.path().display());
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Renderer
// ────────────────────────────────────────────────────────────────────────────

pub struct ChromeRenderer<L = ChromeLauncher> {
    launcher: L,
    slots: RenderSlots,
}

impl ChromeRenderer {
    pub fn new(settings: BrowserSettings, pool_size: usize, queue_timeout: Duration) -> Self {
        Self::with_launcher(ChromeLauncher { settings }, pool_size, queue_timeout)
    }
}

impl<L: BrowserLauncher> ChromeRenderer<L> {
    pub fn with_launcher(launcher: L, pool_size: usize, queue_timeout: Duration) -> Self {
        info!("Chrome renderer: {} slots, queue timeout {:?}", pool_size.max(1), queue_timeout);
        Self {
            launcher,
            slots: RenderSlots::new(pool_size, queue_timeout),
        }
    }
}

#[async_trait]
impl<L: BrowserLauncher> DocumentRenderer for ChromeRenderer<L> {
    async fn render_pdf(&self, html: &str, deadline: Instant) -> Result<Bytes, RenderError> {
        let _slot = self.slots.acquire(deadline).await?;
        debug!("Render slot acquired ({} free)", self.slots.available());

        let session = timeout_at(deadline, self.launcher.launch())
            .await
            .map_err(|_| RenderError::TimedOut)??;

        let result = match timeout_at(deadline, session.print(html)).await {
            Ok(result) => result,
            Err(_) => Err(RenderError::TimedOut),
        };

        // Teardown runs whether or not printing succeeded.
        session.close().await;

        let pdf = result?;
        debug!("Rendered PDF ({} bytes)", pdf.len());
        Ok(pdf)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::render::{build_html_document, ResolvedStyle};

    #[derive(Clone, Copy)]
    enum Print {
        Pdf,
        Fail,
        Hang,
    }

    #[derive(Default)]
    struct Counters {
        launched: AtomicUsize,
        closed: AtomicUsize,
        dropped: AtomicUsize,
    }

    struct FakeLauncher {
        print: Print,
        fail_launch: bool,
        counters: Arc<Counters>,
    }

    struct FakeSession {
        print: Print,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl BrowserLauncher for FakeLauncher {
        type Session = FakeSession;

        async fn launch(&self) -> Result<FakeSession, RenderError> {
            if self.fail_launch {
                return Err(RenderError::Launch("no chrome".to_string()));
            }
            self.counters.launched.fetch_add(1, Ordering::SeqCst);
            Ok(FakeSession {
                print: self.print,
                counters: self.counters.clone(),
            })
        }
    }

    #[async_trait]
    impl PrintSession for FakeSession {
        async fn print(&self, _html: &str) -> Result<Bytes, RenderError> {
            match self.print {
                Print::Pdf => Ok(Bytes::from_static(b"%PDF-1.4 fake")),
                Print::Fail => Err(RenderError::Print("crashed".to_string())),
                Print::Hang => std::future::pending().await,
            }
        }

        async fn close(self) {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Drop for FakeSession {
        fn drop(&mut self) {
            self.counters.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn renderer(print: Print, fail_launch: bool) -> (ChromeRenderer<FakeLauncher>, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let launcher = FakeLauncher {
            print,
            fail_launch,
            counters: counters.clone(),
        };
        (
            ChromeRenderer::with_launcher(launcher, 1, Duration::from_secs(1)),
            counters,
        )
    }

    fn in_secs(secs: u64) -> Instant {
        Instant::now() + Duration::from_secs(secs)
    }

    #[tokio::test]
    async fn test_render_closes_browser_after_success() {
        let (renderer, counters) = renderer(Print::Pdf, false);

        let pdf = renderer.render_pdf("<html></html>", in_secs(10)).await.unwrap();

        assert!(pdf.starts_with(b"%PDF-"));
        assert_eq!(counters.launched.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.slots.available(), 1);
    }

    #[tokio::test]
    async fn test_render_closes_browser_after_print_failure() {
        let (renderer, counters) = renderer(Print::Fail, false);

        let err = renderer.render_pdf("<html></html>", in_secs(10)).await.unwrap_err();

        assert!(matches!(err, RenderError::Print(_)));
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.slots.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_closes_browser_when_deadline_passes() {
        let (renderer, counters) = renderer(Print::Hang, false);

        let err = renderer.render_pdf("<html></html>", in_secs(5)).await.unwrap_err();

        assert!(matches!(err, RenderError::TimedOut));
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.slots.available(), 1);
    }

    #[tokio::test]
    async fn test_launch_failure_releases_slot() {
        let (renderer, counters) = renderer(Print::Pdf, true);

        let err = renderer.render_pdf("<html></html>", in_secs(10)).await.unwrap_err();

        assert!(matches!(err, RenderError::Launch(_)));
        assert_eq!(counters.closed.load(Ordering::SeqCst), 0);
        assert_eq!(renderer.slots.available(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_render_drops_session_and_slot() {
        let (renderer, counters) = renderer(Print::Hang, false);

        let cancelled = timeout(
            Duration::from_secs(1),
            renderer.render_pdf("<html></html>", in_secs(60)),
        )
        .await;

        assert!(cancelled.is_err());
        assert_eq!(counters.launched.load(Ordering::SeqCst), 1);
        assert_eq!(counters.dropped.load(Ordering::SeqCst), 1);
        assert_eq!(renderer.slots.available(), 1);
    }

    #[tokio::test]
    async fn test_network_idle_ignores_events_before_init() {
        let events = |names: &[&str]| {
            futures::stream::iter(names.iter().map(|n| n.to_string()).collect::<Vec<_>>())
        };

        assert!(wait_for_network_idle(events(&["init", "load", "networkIdle"])).await);
        assert!(!wait_for_network_idle(events(&["networkIdle", "init", "load"])).await);
        assert!(!wait_for_network_idle(events(&[])).await);
    }

    #[tokio::test]
    #[ignore = "needs a local Chrome binary in CHROME_EXECUTABLE"]
    async fn test_chrome_prints_real_pdf_and_exits() {
        let Some(executable) = std::env::var_os("CHROME_EXECUTABLE") else {
            return;
        };
        let settings = BrowserSettings {
            executable: Some(PathBuf::from(executable)),
            no_sandbox: true,
        };
        let html = build_html_document("<h1>Jane Doe</h1><p>Rust</p>", &ResolvedStyle::default());

        let session = BrowserSession::launch(&settings).await.unwrap();
        let profile_dir = session.profile_dir.path().to_path_buf();
        let pdf = session.print(&html).await.unwrap();
        session.close().await;

        assert!(pdf.starts_with(b"%PDF-"));
        assert!(!profile_dir.exists());

        let renderer = ChromeRenderer::new(settings, 1, Duration::from_secs(5));
        let pdf = renderer.render_pdf(&html, in_secs(60)).await.unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
        assert_eq!(renderer.slots.available(), 1);
    }

    #[test]
    fn test_print_params_are_a4_with_25mm_margins() {
        let params = a4_print_params();
        let width = params.paper_width.unwrap();
        let height = params.paper_height.unwrap();
        assert!((width - 8.2677).abs() < 1e-3);
        assert!((height - 11.6929).abs() < 1e-3);
        for margin in [
            params.margin_top,
            params.margin_bottom,
            params.margin_left,
            params.margin_right,
        ] {
            assert!((margin.unwrap() * MM_PER_INCH - 25.0).abs() < 1e-9);
        }
        assert_eq!(params.print_background, Some(true));
        assert_eq!(params.display_header_footer, Some(false));
    }

    #[tokio::test]
    async fn test_slots_reject_when_saturated() {
        let slots = RenderSlots::new(1, Duration::from_millis(20));
        let deadline = Instant::now() + Duration::from_secs(10);

        let held = slots.acquire(deadline).await.unwrap();
        assert_eq!(slots.available(), 0);

        let err = slots.acquire(deadline).await.unwrap_err();
        assert!(matches!(err, RenderError::Busy { capacity: 1, .. }));

        drop(held);
        assert!(slots.acquire(deadline).await.is_ok());
    }

    #[tokio::test]
    async fn test_slots_report_timeout_when_deadline_is_sooner() {
        let slots = RenderSlots::new(1, Duration::from_secs(30));
        let deadline = Instant::now() + Duration::from_millis(20);

        let _held = slots.acquire(deadline).await.unwrap();
        let err = slots.acquire(deadline).await.unwrap_err();
        assert!(matches!(err, RenderError::TimedOut));
    }

    #[tokio::test]
    async fn test_waiter_gets_slot_once_released() {
        let slots = std::sync::Arc::new(RenderSlots::new(1, Duration::from_secs(5)));
        let deadline = Instant::now() + Duration::from_secs(10);

        let held = slots.acquire(deadline).await.unwrap();
        let waiter = {
            let slots = slots.clone();
            tokio::spawn(async move { slots.acquire(deadline).await.map(|_| ()) })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        drop(held);

        assert!(waiter.await.unwrap().is_ok());
    }

    #[test]
    fn test_zero_pool_size_is_clamped() {
        let slots = RenderSlots::new(0, Duration::from_secs(1));
        assert_eq!(slots.available(), 1);
    }
}

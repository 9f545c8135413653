//! Dock 아이콘 표시 관리
//!
//! 트레이 유틸리티이므로 평소에는 Dock 아이콘을 숨기고,
//! 설정 창 같은 UI가 열려 있는 동안에만 표시합니다.
//! 열린 UI 수를 참조 카운트로 추적합니다.

use std::sync::Mutex;

/// Dock 활성화 정책을 바꾸는 플랫폼 바인딩
pub trait DockController: Send + Sync {
    /// `true`: 일반 앱 (Dock 표시), `false`: 액세서리 (상태 표시줄만)
    fn set_dock_visible(&self, visible: bool);
    /// 앱을 전면으로
    fn activate_app(&self);
}

/// 정책 변경을 로그로만 남기는 컨트롤러 (AppKit 바인딩이 없는 환경용)
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDock;

impl DockController for TracingDock {
    fn set_dock_visible(&self, visible: bool) {
        tracing::info!(
            "[Dock] activation policy -> {}",
            if visible { "regular" } else { "accessory" }
        );
    }

    fn activate_app(&self) {
        tracing::info!("[Dock] activate app");
    }
}

/// 열린 UI 창 참조 카운트
pub struct UiSessionTracker<D: DockController> {
    dock: D,
    refcount: Mutex<usize>,
}

impl<D: DockController> UiSessionTracker<D> {
    pub fn new(dock: D) -> Self {
        Self {
            dock,
            refcount: Mutex::new(0),
        }
    }

    pub fn refcount(&self) -> usize {
        *self.refcount.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// UI 창이 열림. 첫 창이면 Dock 아이콘을 표시하고 앱을 활성화합니다.
    pub fn begin(&self) -> usize {
        let mut count = self.refcount.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
        if *count == 1 {
            self.dock.set_dock_visible(true);
            self.dock.activate_app();
        }
        *count
    }

    /// UI 창이 닫힘. 남은 창이 없으면 Dock 아이콘을 숨깁니다.
    pub fn end(&self) -> usize {
        let mut count = self.refcount.lock().unwrap_or_else(|e| e.into_inner());
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.dock.set_dock_visible(false);
        }
        *count
    }

    /// 스코프가 끝나면 `end`를 호출하는 가드
    pub fn session(&self) -> UiSession<'_, D> {
        self.begin();
        UiSession { tracker: self }
    }
}

pub struct UiSession<'a, D: DockController> {
    tracker: &'a UiSessionTracker<D>,
}

impl<D: DockController> Drop for UiSession<'_, D> {
    fn drop(&mut self) {
        self.tracker.end();
    }
}

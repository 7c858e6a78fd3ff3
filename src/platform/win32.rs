//! Win32 implementation: a borderless tool window parented to the desktop
//! WorkerW layer, with a separate topmost strip on the right edge that
//! reports hover for peeking.
//!
//! Window procedures cannot capture state, so input and the paint model go
//! through thread-local buffers. Both windows belong to the UI thread.

use super::{MenuState, PlatformEvent, SurfaceId, WindowSystem};
use crate::ui::{RenderModel, Renderer, StatusLine};
use anyhow::{bail, Result};
use deskmon_types::{Color, Point, Rect, ScreenGeometry};
use std::cell::{Cell, RefCell};
use std::ptr::null;
use std::time::Duration;

use windows_sys::Win32::Foundation::{BOOL, HWND, LPARAM, LRESULT, POINT, RECT, WPARAM};
use windows_sys::Win32::Graphics::Gdi::{
    BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, GetStockObject,
    InvalidateRect, ScreenToClient, SelectObject, SetBkColor, SetTextColor, TextOutW,
    DEFAULT_GUI_FONT, HDC, PAINTSTRUCT,
};
use windows_sys::Win32::System::LibraryLoader::GetModuleHandleW;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{GetCapture, ReleaseCapture, SetCapture};
use windows_sys::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow,
    DispatchMessageW, EnumWindows, FindWindowExW, FindWindowW, GetAncestor, GetClassNameW,
    GetClientRect, GetCursorPos, GetSystemMetrics, GetWindowLongW, GetWindowRect, LoadCursorW,
    MsgWaitForMultipleObjects, PeekMessageW, RegisterClassW, SendMessageTimeoutW,
    SetLayeredWindowAttributes, SetParent, SetWindowLongW, SetWindowPos, ShowWindow,
    TrackPopupMenu, TranslateMessage, WindowFromPoint, GA_PARENT, GA_ROOT, GWL_EXSTYLE,
    HWND_BOTTOM, HWND_NOTOPMOST, HWND_TOPMOST, IDC_ARROW, LWA_ALPHA, MA_NOACTIVATE,
    MF_CHECKED, MF_SEPARATOR, MF_STRING, MF_UNCHECKED, MSG, PM_REMOVE, QS_ALLINPUT,
    SMTO_NORMAL, SM_CXVIRTUALSCREEN, SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN,
    SM_YVIRTUALSCREEN, SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_HIDE,
    SW_SHOWNOACTIVATE, TPM_RETURNCMD, TPM_RIGHTBUTTON, WM_CLOSE, WM_ERASEBKGND,
    WM_LBUTTONDOWN, WM_LBUTTONUP, WM_MOUSEACTIVATE, WM_MOUSEMOVE, WM_PAINT, WM_QUIT,
    WM_RBUTTONUP, WNDCLASSW, WS_EX_APPWINDOW, WS_EX_LAYERED, WS_EX_NOACTIVATE,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

const WIDGET_CLASS: &str = "DeskmonWidget";
const TRIGGER_CLASS: &str = "DeskmonTrigger";

/// Undocumented Progman message that spawns the WorkerW behind the icons
const SPAWN_WORKERW: u32 = 0x052C;
const SPAWN_TIMEOUT_MS: u32 = 1000;

const WIDGET_WIDTH: i32 = 180;
const HEADER_HEIGHT: i32 = 26;
const ROW_HEIGHT: i32 = 20;
const STATUS_HEIGHT: i32 = 24;
const PADDING: i32 = 8;
const VALUE_COLUMNS: [i32; 2] = [64, 122];
const WIDGET_ALPHA: u8 = 224;
// Nearly invisible but still hit-tested
const TRIGGER_ALPHA: u8 = 1;

const BACKGROUND: Color = Color::from_hex(0x1a1a2e);
const TITLE: Color = Color::from_hex(0x7c83ff);

const MENU_TOPMOST: usize = 1;
const MENU_PEEK: usize = 2;
const MENU_ALERTS: usize = 3;
const MENU_QUIT: usize = 4;

const MK_LBUTTON: usize = 0x0001;

#[derive(Debug, Default)]
struct PaintModel {
    rows: Vec<(String, Color, Vec<(String, Color)>)>,
    status: Option<(String, Color)>,
}

thread_local! {
    static EVENTS: RefCell<Vec<PlatformEvent>> = RefCell::new(Vec::new());
    static PAINT: RefCell<PaintModel> = RefCell::new(PaintModel::default());
    static MENU: Cell<MenuState> = Cell::new(MenuState::default());
}

fn push_event(event: PlatformEvent) {
    EVENTS.with(|events| {
        let mut events = events.borrow_mut();
        // Hover floods the queue with identical events
        if event == PlatformEvent::TriggerEntered && events.last() == Some(&event) {
            return;
        }
        events.push(event);
    });
}

fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn cursor_pos() -> Option<Point> {
    let mut pt = POINT { x: 0, y: 0 };
    // SAFETY: pt is a valid out pointer
    (unsafe { GetCursorPos(&mut pt) } != 0).then(|| Point::new(pt.x, pt.y))
}

fn class_name(hwnd: HWND) -> String {
    let mut buf = [0u16; 64];
    // SAFETY: buf length is passed
    let len = unsafe { GetClassNameW(hwnd, buf.as_mut_ptr(), buf.len() as i32) };
    String::from_utf16_lossy(&buf[..len.max(0) as usize])
}

/// Creates the native windows
pub struct Win32Widget;

impl Win32Widget {
    /// Register the classes and create the widget and its (hidden) trigger
    /// strip. Returns the window system and a renderer painting into it.
    pub fn create() -> Result<(Win32WindowSystem, Win32Renderer)> {
        // SAFETY: plain Win32 calls on the current thread; every pointer is
        // either null or points at a live, null-terminated buffer
        unsafe {
            let instance = GetModuleHandleW(null());
            let cursor = LoadCursorW(0, IDC_ARROW);

            for (name, proc_) in [
                (WIDGET_CLASS, widget_proc as WndProc),
                (TRIGGER_CLASS, trigger_proc as WndProc),
            ] {
                let class = wide(name);
                let wc = WNDCLASSW {
                    style: 0,
                    lpfnWndProc: Some(proc_),
                    cbClsExtra: 0,
                    cbWndExtra: 0,
                    hInstance: instance,
                    hIcon: 0,
                    hCursor: cursor,
                    hbrBackground: 0,
                    lpszMenuName: null(),
                    lpszClassName: class.as_ptr(),
                };
                if RegisterClassW(&wc) == 0 {
                    bail!("Failed to register window class {}", name);
                }
            }

            let widget_class = wide(WIDGET_CLASS);
            let title = wide("deskmon");
            let hwnd = CreateWindowExW(
                WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE | WS_EX_LAYERED,
                widget_class.as_ptr(),
                title.as_ptr(),
                WS_POPUP,
                0,
                0,
                WIDGET_WIDTH,
                content_height(0),
                0,
                0,
                instance,
                null(),
            );
            if hwnd == 0 {
                bail!("Failed to create widget window");
            }
            SetLayeredWindowAttributes(hwnd, 0, WIDGET_ALPHA, LWA_ALPHA);

            let trigger_class = wide(TRIGGER_CLASS);
            let trigger = CreateWindowExW(
                WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE | WS_EX_LAYERED | WS_EX_TOPMOST,
                trigger_class.as_ptr(),
                null(),
                WS_POPUP,
                0,
                0,
                1,
                1,
                0,
                0,
                instance,
                null(),
            );
            if trigger == 0 {
                DestroyWindow(hwnd);
                bail!("Failed to create trigger window");
            }
            SetLayeredWindowAttributes(trigger, 0, TRIGGER_ALPHA, LWA_ALPHA);

            ShowWindow(hwnd, SW_SHOWNOACTIVATE);
            log::debug!("Created widget window {:#x}, trigger {:#x}", hwnd, trigger);

            Ok((
                Win32WindowSystem {
                    hwnd,
                    trigger,
                    parent: 0,
                    destroyed: false,
                },
                Win32Renderer { hwnd, rows: 0 },
            ))
        }
    }
}

type WndProc = unsafe extern "system" fn(HWND, u32, WPARAM, LPARAM) -> LRESULT;

fn content_height(rows: usize) -> i32 {
    HEADER_HEIGHT + ROW_HEIGHT * rows as i32 + STATUS_HEIGHT
}

pub struct Win32WindowSystem {
    hwnd: HWND,
    trigger: HWND,
    /// Current parent window; 0 while top-level
    parent: HWND,
    destroyed: bool,
}

impl WindowSystem for Win32WindowSystem {
    fn find_desktop_surface(&mut self) -> Option<SurfaceId> {
        let progman_class = wide("Progman");
        let worker_class = wide("WorkerW");
        // SAFETY: class strings outlive the calls; the EnumWindows callback
        // only writes through the HWND pointer passed as lparam
        unsafe {
            let progman = FindWindowW(progman_class.as_ptr(), null());
            if progman == 0 {
                log::warn!("Progman window not found");
                return None;
            }
            let mut result = 0usize;
            SendMessageTimeoutW(
                progman,
                SPAWN_WORKERW,
                0,
                0,
                SMTO_NORMAL,
                SPAWN_TIMEOUT_MS,
                &mut result,
            );

            let mut worker: HWND = 0;
            EnumWindows(Some(find_worker), &mut worker as *mut HWND as LPARAM);
            if worker == 0 {
                // Newer shells keep the WorkerW inside Progman
                worker = FindWindowExW(progman, 0, worker_class.as_ptr(), null());
            }
            (worker != 0).then_some(SurfaceId(worker))
        }
    }

    fn reparent(&mut self, parent: Option<SurfaceId>) -> bool {
        let target = parent.map_or(0, |s| s.0);
        // SAFETY: hwnd is our own window; target is 0 or a window handle
        unsafe {
            SetParent(self.hwnd, target);
            let ok = target == 0 || GetAncestor(self.hwnd, GA_PARENT) == target;
            self.parent = if ok { target } else { 0 };
            ok
        }
    }

    fn apply_tool_window_style(&mut self) {
        // SAFETY: reads and writes our own window's extended style
        unsafe {
            let style = GetWindowLongW(self.hwnd, GWL_EXSTYLE) as u32;
            let style = (style | WS_EX_TOOLWINDOW | WS_EX_NOACTIVATE) & !WS_EX_APPWINDOW;
            SetWindowLongW(self.hwnd, GWL_EXSTYLE, style as i32);
        }
    }

    fn set_topmost(&mut self, topmost: bool) {
        let after = if topmost { HWND_TOPMOST } else { HWND_NOTOPMOST };
        // SAFETY: z-order change on our own window
        unsafe {
            SetWindowPos(
                self.hwnd,
                after,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            );
        }
    }

    fn send_to_bottom(&mut self) {
        // SAFETY: z-order change on our own window
        unsafe {
            SetWindowPos(
                self.hwnd,
                HWND_BOTTOM,
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
            );
        }
    }

    fn move_to(&mut self, position: Point) {
        let mut pt = POINT {
            x: position.x,
            y: position.y,
        };
        // SAFETY: pt is a valid in/out pointer
        unsafe {
            // Child windows are positioned in the parent's client area
            if self.parent != 0 {
                ScreenToClient(self.parent, &mut pt);
            }
            SetWindowPos(
                self.hwnd,
                0,
                pt.x,
                pt.y,
                0,
                0,
                SWP_NOSIZE | SWP_NOZORDER | SWP_NOACTIVATE,
            );
        }
    }

    fn widget_size(&self) -> (i32, i32) {
        let mut rect = RECT {
            left: 0,
            top: 0,
            right: 0,
            bottom: 0,
        };
        // SAFETY: rect is a valid out pointer
        if unsafe { GetWindowRect(self.hwnd, &mut rect) } == 0 {
            return (WIDGET_WIDTH, content_height(0));
        }
        (rect.right - rect.left, rect.bottom - rect.top)
    }

    fn cursor_position(&self) -> Option<Point> {
        cursor_pos()
    }

    fn virtual_screen(&self) -> ScreenGeometry {
        // SAFETY: no pointers involved
        unsafe {
            ScreenGeometry::new(
                GetSystemMetrics(SM_XVIRTUALSCREEN),
                GetSystemMetrics(SM_YVIRTUALSCREEN),
                GetSystemMetrics(SM_CXVIRTUALSCREEN),
                GetSystemMetrics(SM_CYVIRTUALSCREEN),
            )
        }
    }

    fn desktop_visible_at(&self, point: Point) -> bool {
        // SAFETY: no pointers involved beyond class_name's own buffer
        let root = unsafe {
            let hit = WindowFromPoint(POINT {
                x: point.x,
                y: point.y,
            });
            if hit == 0 {
                return true;
            }
            GetAncestor(hit, GA_ROOT)
        };
        if root == self.hwnd {
            return true;
        }
        matches!(class_name(root).as_str(), "Progman" | "WorkerW")
    }

    fn set_trigger_region(&mut self, region: Option<Rect>) {
        // SAFETY: show/hide and move our own trigger window
        unsafe {
            match region {
                Some(r) => {
                    SetWindowPos(
                        self.trigger,
                        HWND_TOPMOST,
                        r.x,
                        r.y,
                        r.width,
                        r.height,
                        SWP_NOACTIVATE,
                    );
                    ShowWindow(self.trigger, SW_SHOWNOACTIVATE);
                }
                None => {
                    ShowWindow(self.trigger, SW_HIDE);
                }
            }
        }
    }

    fn update_menu(&mut self, menu: MenuState) {
        MENU.with(|m| m.set(menu));
    }

    fn pump_events(&mut self, timeout: Duration) -> Vec<PlatformEvent> {
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        // SAFETY: msg is a valid buffer for the whole loop
        unsafe {
            MsgWaitForMultipleObjects(0, null(), 0, millis, QS_ALLINPUT);
            let mut msg: MSG = std::mem::zeroed();
            while PeekMessageW(&mut msg, 0, 0, 0, PM_REMOVE) != 0 {
                if msg.message == WM_QUIT {
                    push_event(PlatformEvent::Quit);
                    continue;
                }
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        EVENTS.with(|events| std::mem::take(&mut *events.borrow_mut()))
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        // SAFETY: both handles were created by us and are destroyed once
        unsafe {
            DestroyWindow(self.trigger);
            DestroyWindow(self.hwnd);
        }
        log::debug!("Native windows destroyed");
    }
}

unsafe extern "system" fn find_worker(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let shell = wide("SHELLDLL_DefView");
    let worker_class = wide("WorkerW");
    if FindWindowExW(hwnd, 0, shell.as_ptr(), null()) != 0 {
        // The WorkerW we want is the sibling after the icon host
        let worker = FindWindowExW(0, hwnd, worker_class.as_ptr(), null());
        if worker != 0 {
            *(lparam as *mut HWND) = worker;
            return 0;
        }
    }
    1
}

unsafe extern "system" fn widget_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_MOUSEACTIVATE => MA_NOACTIVATE as LRESULT,
        WM_ERASEBKGND => 1,
        WM_PAINT => {
            paint(hwnd);
            0
        }
        WM_LBUTTONDOWN => {
            SetCapture(hwnd);
            if let Some(p) = cursor_pos() {
                push_event(PlatformEvent::DragStart(p));
            }
            0
        }
        WM_MOUSEMOVE => {
            if GetCapture() == hwnd && wparam & MK_LBUTTON != 0 {
                if let Some(p) = cursor_pos() {
                    push_event(PlatformEvent::DragMove(p));
                }
            }
            0
        }
        WM_LBUTTONUP => {
            if GetCapture() == hwnd {
                ReleaseCapture();
                push_event(PlatformEvent::DragEnd);
            }
            0
        }
        WM_RBUTTONUP => {
            if let Some(event) = show_context_menu(hwnd) {
                push_event(event);
            }
            0
        }
        WM_CLOSE => {
            push_event(PlatformEvent::Quit);
            0
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

unsafe extern "system" fn trigger_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_MOUSEACTIVATE => MA_NOACTIVATE as LRESULT,
        WM_MOUSEMOVE => {
            push_event(PlatformEvent::TriggerEntered);
            0
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

unsafe fn show_context_menu(hwnd: HWND) -> Option<PlatformEvent> {
    let state = MENU.with(Cell::get);
    let cursor = cursor_pos()?;
    let menu = CreatePopupMenu();
    if menu == 0 {
        log::warn!("Failed to create context menu");
        return None;
    }

    let check = |on: bool| if on { MF_CHECKED } else { MF_UNCHECKED };
    let items = [
        (MENU_TOPMOST, "Always on top", check(state.topmost)),
        (MENU_PEEK, "Peek from right edge", check(state.peek_enabled)),
        (MENU_ALERTS, "Critical alerts", check(state.alerts_enabled)),
    ];
    for (id, label, flags) in items {
        let label = wide(label);
        AppendMenuW(menu, MF_STRING | flags, id, label.as_ptr());
    }
    AppendMenuW(menu, MF_SEPARATOR, 0, null());
    let quit = wide("Quit");
    AppendMenuW(menu, MF_STRING, MENU_QUIT, quit.as_ptr());

    let chosen = TrackPopupMenu(
        menu,
        TPM_RETURNCMD | TPM_RIGHTBUTTON,
        cursor.x,
        cursor.y,
        0,
        hwnd,
        null(),
    );
    DestroyMenu(menu);

    match chosen as usize {
        MENU_TOPMOST => Some(PlatformEvent::ToggleTopmost),
        MENU_PEEK => Some(PlatformEvent::TogglePeek),
        MENU_ALERTS => Some(PlatformEvent::ToggleAlerts),
        MENU_QUIT => Some(PlatformEvent::Quit),
        _ => None,
    }
}

unsafe fn draw_text(hdc: HDC, x: i32, y: i32, text: &str, color: Color) {
    let utf16: Vec<u16> = text.encode_utf16().collect();
    SetTextColor(hdc, color.to_bgr());
    TextOutW(hdc, x, y, utf16.as_ptr(), utf16.len() as i32);
}

unsafe fn paint(hwnd: HWND) {
    let mut ps: PAINTSTRUCT = std::mem::zeroed();
    let hdc = BeginPaint(hwnd, &mut ps);
    if hdc == 0 {
        return;
    }

    let mut client = RECT {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };
    GetClientRect(hwnd, &mut client);
    let brush = CreateSolidBrush(BACKGROUND.to_bgr());
    FillRect(hdc, &client, brush);
    DeleteObject(brush);

    let old_font = SelectObject(hdc, GetStockObject(DEFAULT_GUI_FONT));
    SetBkColor(hdc, BACKGROUND.to_bgr());
    draw_text(hdc, PADDING, 6, "HW Monitor", TITLE);

    PAINT.with(|model| {
        let model = model.borrow();
        let mut y = HEADER_HEIGHT;
        for (label, accent, values) in &model.rows {
            draw_text(hdc, PADDING, y, label, *accent);
            for ((text, color), x) in values.iter().zip(VALUE_COLUMNS) {
                draw_text(hdc, x, y, text, *color);
            }
            y += ROW_HEIGHT;
        }
        if let Some((text, color)) = &model.status {
            draw_text(hdc, PADDING, client.bottom - STATUS_HEIGHT + 4, text, *color);
        }
    });

    SelectObject(hdc, old_font);
    EndPaint(hwnd, &ps);
}

/// GDI renderer for the widget window
pub struct Win32Renderer {
    hwnd: HWND,
    /// Row count the window is currently sized for
    rows: usize,
}

impl Win32Renderer {
    fn invalidate(&self) {
        // SAFETY: repaint request on our own window
        unsafe {
            InvalidateRect(self.hwnd, null(), 0);
        }
    }
}

impl Renderer for Win32Renderer {
    fn render(&mut self, model: &RenderModel) {
        PAINT.with(|paint| {
            paint.borrow_mut().rows = model
                .rows
                .iter()
                .map(|row| {
                    let values = row
                        .values
                        .iter()
                        .map(|v| (v.text.clone(), v.color))
                        .collect();
                    (row.label.clone(), row.accent, values)
                })
                .collect();
        });

        if model.rows.len() != self.rows {
            self.rows = model.rows.len();
            // SAFETY: resize our own window, keeping position and z-order
            unsafe {
                SetWindowPos(
                    self.hwnd,
                    0,
                    0,
                    0,
                    WIDGET_WIDTH,
                    content_height(self.rows),
                    SWP_NOMOVE | SWP_NOZORDER | SWP_NOACTIVATE,
                );
            }
        }
        self.invalidate();
    }

    fn set_status(&mut self, status: &StatusLine) {
        PAINT.with(|paint| {
            paint.borrow_mut().status = Some((status.text.clone(), status.color));
        });
        self.invalidate();
    }
}

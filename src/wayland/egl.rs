use anyhow::{anyhow, Result};
use khronos_egl as egl;
use std::ffi::c_void;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::Proxy;

const CONFIG_ATTRIBS: [egl::Int; 13] = [
    egl::SURFACE_TYPE, egl::WINDOW_BIT,
    egl::RED_SIZE, 8,
    egl::GREEN_SIZE, 8,
    egl::BLUE_SIZE, 8,
    egl::ALPHA_SIZE, 8,
    egl::RENDERABLE_TYPE, egl::OPENGL_ES2_BIT,
    egl::NONE,
];

const CONTEXT_ATTRIBS: [egl::Int; 3] = [egl::CONTEXT_CLIENT_VERSION, 2, egl::NONE];

/// GLES2 context bound to the single layer surface.
pub struct EglContext {
    instance: egl::Instance<egl::Static>,
    display: egl::Display,
    context: egl::Context,
    surface: egl::Surface,
    // Must outlive `surface`; fields drop after `Drop::drop` runs
    _window: wayland_egl::WlEglSurface,
}

impl EglContext {
    pub fn new(wl_display: *mut c_void, wl_surface: &WlSurface, size: [u32; 2]) -> Result<Self> {
        let instance = egl::Instance::new(egl::Static);

        let display = unsafe {
            instance
                .get_display(wl_display as egl::NativeDisplayType)
                .ok_or_else(|| anyhow!("Failed to get EGL display"))?
        };
        let (major, minor) = instance.initialize(display)?;
        log::info!("EGL version: {}.{}", major, minor);

        let config = instance
            .choose_first_config(display, &CONFIG_ATTRIBS)?
            .ok_or_else(|| anyhow!("No EGL config with RGBA8 + GLES2"))?;
        instance.bind_api(egl::OPENGL_ES_API)?;
        let context = instance.create_context(display, config, None, &CONTEXT_ATTRIBS)?;

        let window = wayland_egl::WlEglSurface::new(wl_surface.id(), size[0] as i32, size[1] as i32)?;
        let surface = unsafe {
            instance.create_window_surface(
                display,
                config,
                window.ptr() as egl::NativeWindowType,
                None,
            )?
        };

        let ctx = Self {
            instance,
            display,
            context,
            surface,
            _window: window,
        };
        ctx.make_current()?;
        Ok(ctx)
    }

    pub fn make_current(&self) -> Result<()> {
        self.instance.make_current(
            self.display,
            Some(self.surface),
            Some(self.surface),
            Some(self.context),
        )?;
        Ok(())
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.instance.swap_buffers(self.display, self.surface)?;
        Ok(())
    }

    pub fn get_proc_address(&self, name: &str) -> *const c_void {
        self.instance
            .get_proc_address(name)
            .map_or(std::ptr::null(), |f| f as *const c_void)
    }
}

impl Drop for EglContext {
    fn drop(&mut self) {
        unsafe {
            let _ = self.instance.make_current(self.display, None, None, None);
            let _ = self.instance.destroy_surface(self.display, self.surface);
            let _ = self.instance.destroy_context(self.display, self.context);
            let _ = self.instance.terminate(self.display);
        }
    }
}

use super::math::{Color, Vec2};
use anyhow::{anyhow, Result};
use glow::HasContext;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

const CIRCLE_SEGMENTS: usize = 20;
const CORNER_SEGMENTS: usize = 6;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
}

/// Immediate-mode triangle batcher. Color is a uniform, so vertices are
/// batched until the color changes or `flush` is called.
pub struct DrawContext {
    gl: glow::Context,
    program: glow::Program,
    vbo: glow::Buffer,
    vertices: Vec<Vertex>,
    color: Option<Color>,

    u_viewport: Option<glow::UniformLocation>,
    u_color: Option<glow::UniformLocation>,
    a_pos: Option<u32>,
}

impl DrawContext {
    pub fn new(gl: glow::Context, program: glow::Program) -> Result<Self> {
        let vbo = unsafe {
            gl.create_buffer()
                .map_err(|e| anyhow!("Failed to create vertex buffer: {}", e))?
        };

        let u_viewport = unsafe { gl.get_uniform_location(program, "uViewport") };
        let u_color = unsafe { gl.get_uniform_location(program, "uColor") };
        let a_pos = unsafe { gl.get_attrib_location(program, "aPos") };

        Ok(Self {
            gl,
            program,
            vbo,
            vertices: Vec::with_capacity(4096),
            color: None,
            u_viewport,
            u_color,
            a_pos,
        })
    }

    pub fn begin(&mut self, viewport_px: [f32; 2], clear: Color) {
        self.vertices.clear();
        self.color = None;

        unsafe {
            self.gl.viewport(0, 0, viewport_px[0] as i32, viewport_px[1] as i32);
            self.gl.clear_color(clear.r, clear.g, clear.b, clear.a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);

            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);

            self.gl.use_program(Some(self.program));
            if let Some(loc) = &self.u_viewport {
                self.gl.uniform_2_f32(Some(loc), viewport_px[0], viewport_px[1]);
            }
        }
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color) {
        self.set_color(color);
        self.quad([x, y], [x + w, y], [x + w, y + h], [x, y + h]);
    }

    pub fn round_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, color: Color) {
        let r = radius.min(w * 0.5).min(h * 0.5).max(0.0);
        if r == 0.0 {
            self.rect(x, y, w, h, color);
            return;
        }

        self.set_color(color);
        // Cross of three rects, then the four corners
        self.quad([x + r, y], [x + w - r, y], [x + w - r, y + h], [x + r, y + h]);
        self.quad([x, y + r], [x + r, y + r], [x + r, y + h - r], [x, y + h - r]);
        self.quad([x + w - r, y + r], [x + w, y + r], [x + w, y + h - r], [x + w - r, y + h - r]);

        self.fan(Vec2::new(x + r, y + r), r, PI, PI + FRAC_PI_2, CORNER_SEGMENTS);
        self.fan(Vec2::new(x + w - r, y + r), r, -FRAC_PI_2, 0.0, CORNER_SEGMENTS);
        self.fan(Vec2::new(x + w - r, y + h - r), r, 0.0, FRAC_PI_2, CORNER_SEGMENTS);
        self.fan(Vec2::new(x + r, y + h - r), r, FRAC_PI_2, PI, CORNER_SEGMENTS);
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, thickness: f32, color: Color) {
        self.set_color(color);
        self.segment(from, to, thickness);
    }

    pub fn polyline(&mut self, points: &[Vec2], thickness: f32, color: Color) {
        self.set_color(color);
        for pair in points.windows(2) {
            self.segment(pair[0], pair[1], thickness);
        }
    }

    pub fn circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.set_color(color);
        self.fan(center, radius, 0.0, TAU, CIRCLE_SEGMENTS);
    }

    pub fn flush(&mut self) {
        self.flush_batch();
    }

    fn segment(&mut self, from: Vec2, to: Vec2, thickness: f32) {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let len = (dx * dx + dy * dy).sqrt();
        if len <= f32::EPSILON {
            return;
        }
        let half = thickness * 0.5;
        let (nx, ny) = (-dy / len * half, dx / len * half);

        self.quad(
            [from.x + nx, from.y + ny],
            [to.x + nx, to.y + ny],
            [to.x - nx, to.y - ny],
            [from.x - nx, from.y - ny],
        );
    }

    fn fan(&mut self, center: Vec2, radius: f32, start: f32, end: f32, segments: usize) {
        let step = (end - start) / segments as f32;
        for i in 0..segments {
            let a0 = start + step * i as f32;
            let a1 = a0 + step;
            self.vertices.extend_from_slice(&[
                Vertex { pos: [center.x, center.y] },
                Vertex { pos: [center.x + radius * a0.cos(), center.y + radius * a0.sin()] },
                Vertex { pos: [center.x + radius * a1.cos(), center.y + radius * a1.sin()] },
            ]);
        }
    }

    fn quad(&mut self, a: [f32; 2], b: [f32; 2], c: [f32; 2], d: [f32; 2]) {
        self.vertices.extend_from_slice(&[
            Vertex { pos: a },
            Vertex { pos: b },
            Vertex { pos: c },
            Vertex { pos: a },
            Vertex { pos: c },
            Vertex { pos: d },
        ]);
    }

    fn set_color(&mut self, color: Color) {
        if self.color == Some(color) {
            return;
        }
        self.flush_batch();
        self.color = Some(color);
        unsafe {
            if let Some(loc) = &self.u_color {
                self.gl.uniform_4_f32(Some(loc), color.r, color.g, color.b, color.a);
            }
        }
    }

    fn flush_batch(&mut self) {
        if self.vertices.is_empty() {
            return;
        }

        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));
            self.gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&self.vertices),
                glow::DYNAMIC_DRAW,
            );

            if let Some(a_pos) = self.a_pos {
                self.gl.enable_vertex_attrib_array(a_pos);
                self.gl.vertex_attrib_pointer_f32(
                    a_pos,
                    2,
                    glow::FLOAT,
                    false,
                    std::mem::size_of::<Vertex>() as i32,
                    0,
                );
            }

            self.gl.draw_arrays(glow::TRIANGLES, 0, self.vertices.len() as i32);
        }

        self.vertices.clear();
    }
}

impl Drop for DrawContext {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
            self.gl.delete_program(self.program);
        }
    }
}

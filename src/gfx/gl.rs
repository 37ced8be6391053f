use anyhow::{anyhow, bail, Result};
use glow::HasContext;

const VERTEX_SRC: &str = include_str!("../../assets/shaders/ui.vert.glsl");
const FRAGMENT_SRC: &str = include_str!("../../assets/shaders/ui.frag.glsl");

fn compile_stage(gl: &glow::Context, stage: u32, source: &str) -> Result<glow::Shader> {
    let label = if stage == glow::VERTEX_SHADER { "vertex" } else { "fragment" };
    unsafe {
        let shader = gl
            .create_shader(stage)
            .map_err(|e| anyhow!("Failed to create {} shader: {}", label, e))?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            bail!("{} shader failed to compile: {}", label, log);
        }
        Ok(shader)
    }
}

/// Builds the flat-color program used by `DrawContext`.
pub fn build_program(gl: &glow::Context) -> Result<glow::Program> {
    let stages = [
        compile_stage(gl, glow::VERTEX_SHADER, VERTEX_SRC)?,
        compile_stage(gl, glow::FRAGMENT_SHADER, FRAGMENT_SRC)?,
    ];

    unsafe {
        let program = gl
            .create_program()
            .map_err(|e| anyhow!("Failed to create program: {}", e))?;
        for shader in stages {
            gl.attach_shader(program, shader);
        }
        gl.link_program(program);

        let linked = gl.get_program_link_status(program);
        for shader in stages {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }

        if !linked {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            bail!("Program failed to link: {}", log);
        }

        log::info!("Shader program ready");
        Ok(program)
    }
}

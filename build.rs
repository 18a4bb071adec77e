#[cfg(feature = "shaderc")]
extern crate shaderc;

#[allow(unused_imports)]
use std::fs::File;
#[allow(unused_imports)]
use std::io::{Read, Write};
#[allow(unused_imports)]
use std::path::Path;

#[cfg(feature = "shaderc")]
use shaderc::{CompileOptions, EnvVersion, TargetEnv};

/// GLSL sources in `shaders/` and the stage they are compiled for.
#[cfg(feature = "shaderc")]
const SHADERS: [(&str, shaderc::ShaderKind); 5] = [
    ("offscreen.vert", shaderc::ShaderKind::Vertex),
    ("scene.vert", shaderc::ShaderKind::Vertex),
    ("scene.frag", shaderc::ShaderKind::Fragment),
    ("debug.vert", shaderc::ShaderKind::Vertex),
    ("debug.frag", shaderc::ShaderKind::Fragment),
];

#[cfg(feature = "shaderc")]
fn load_file(path: &Path) -> String {
    let mut out = String::new();
    File::open(path).unwrap().read_to_string(&mut out).unwrap();
    out
}

#[cfg(feature = "shaderc")]
fn save_file(path: &Path, binary: &[u8]) {
    File::create(path).unwrap().write_all(binary).unwrap();
}

#[cfg(feature = "shaderc")]
fn compile_shader(compiler: &shaderc::Compiler, path: &Path, kind: shaderc::ShaderKind, output: &Path) {
    let mut options = CompileOptions::new().unwrap();
    options.set_target_env(TargetEnv::Vulkan, EnvVersion::Vulkan1_0 as u32);
    let binary = compiler
        .compile_into_spirv(&load_file(path), kind, path.as_os_str().to_str().unwrap(), "main", Some(&options))
        .unwrap();
    save_file(output, binary.as_binary_u8());
}

#[cfg(feature = "shaderc")]
fn compile_shaders() {
    let compiler = shaderc::Compiler::new().unwrap();
    for (name, kind) in SHADERS {
        let source = format!("shaders/{name}");
        println!("cargo:rerun-if-changed={source}");
        compile_shader(&compiler, Path::new(&source), kind, Path::new(&format!("{source}.spv")));
    }
}

fn main() {
    #[cfg(feature = "shaderc")]
    compile_shaders();
}

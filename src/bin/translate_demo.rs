//! Translates a small kernel to HLSL and packs its captured constants.
//!
//! Usage: translate_demo [config.toml]

use anyhow::{Context, Result};
use shader_bridge::gpu::types::Float3;
use shader_bridge::syntax::{BinaryOp, Block, LocalDecl, ParamModifier, Parameter};
use shader_bridge::translation::{MemberHandle, MemberKind};
use shader_bridge::{
    allocate_constant_buffer, pack, translate_method_with_config, ConstantBufferHandle, Expr,
    HostBufferAllocator, MethodDecl, ReflectedValue, ShaderValue, StaticMemberTable, Stmt,
    TranslatorConfig, TypeRef,
};

fn sample_kernel() -> MethodDecl {
    MethodDecl::new(TypeRef::new("void"), "Brighten")
        .with_parameter(
            Parameter::new(TypeRef::new("Float3"), "color").with_modifier(ParamModifier::Ref),
        )
        .with_body(vec![
            Stmt::Local(LocalDecl::single(
                TypeRef::new("Float3"),
                "tint",
                Some(Expr::new_object(
                    TypeRef::new("Float3"),
                    vec![Expr::float(1.0), Expr::path("Settings.Warmth"), Expr::float(0.5)],
                )),
            )),
            Stmt::Expr(Expr::assign(
                Expr::ident("color"),
                Expr::binary(
                    BinaryOp::Mul,
                    Expr::binary(BinaryOp::Mul, Expr::ident("color"), Expr::ident("tint")),
                    Expr::call(Expr::path("Math.Max"), vec![
                        Expr::path("Settings.Exposure"),
                        Expr::float(0.0),
                    ]),
                ),
            )),
            Stmt::If {
                cond: Expr::path("Settings.Clamp"),
                then_branch: Block::new(vec![Stmt::Expr(Expr::assign(
                    Expr::ident("color"),
                    Expr::call(Expr::ident("saturate"), vec![Expr::ident("color")]),
                ))]),
                else_branch: None,
            },
        ])
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args().nth(1) {
        Some(path) => TranslatorConfig::load(&path)
            .with_context(|| format!("loading translator config from {}", path))?,
        None => TranslatorConfig::default(),
    };

    let mut resolver = StaticMemberTable::new();
    resolver
        .register_static(MemberHandle::new(
            "Settings",
            "Warmth",
            TypeRef::new("float"),
            MemberKind::Field,
        ))
        .register_static(MemberHandle::new(
            "Settings",
            "Exposure",
            TypeRef::new("float"),
            MemberKind::Property,
        ))
        .register_static(MemberHandle::new(
            "Settings",
            "Clamp",
            TypeRef::new("bool"),
            MemberKind::Field,
        ))
        .register_alias("Math.Max", "max");

    let types = config.type_map();
    let translated = translate_method_with_config(sample_kernel(), &resolver, &types, &config)
        .context("translating sample kernel")?;

    println!("=== HLSL ===");
    println!("{}", translated.to_hlsl());

    println!("\n=== Captured members ===");
    for entry in &translated.captures {
        println!("  {:24} <- {}", entry.name, entry.member.qualified_name());
    }

    // Values of the captured members, in capture order.
    let warmth = 0.8f32;
    let exposure = 1.25f32;
    let clamp = true;
    let captured: [&dyn ReflectedValue; 3] = [&warmth, &exposure, &clamp];

    let allocator = HostBufferAllocator::new();
    let buffer = allocate_constant_buffer(&allocator, &captured)
        .context("uploading captured constants")?;
    println!("\n=== Constant buffer ({} bytes) ===", buffer.capacity());
    for (index, slot) in buffer.slots().iter().enumerate() {
        println!("  c{}: {:?}", index, slot);
    }

    let layout = pack(&[
        ShaderValue::Bool(true),
        ShaderValue::Int(5),
        ShaderValue::Float3(Float3::new(1.0, 2.0, 3.0)),
    ]);
    println!("\n=== Sample layout ===");
    print!("{}", layout.debug_string());

    Ok(())
}

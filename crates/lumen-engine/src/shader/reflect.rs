//! Stage interface and uniform block reflection over naga IR.

use std::collections::BTreeMap;

use naga::{Binding, Handle, Module, Type, TypeInner};

use super::{
    BlockBinding, CompiledStage, ShaderStage, UniformBlockLayout, UniformKind, UniformMember,
    VertexInput,
};

/// A user-defined (location-bound) stage input or output.
#[derive(Debug, Clone)]
pub(crate) struct InterfaceVar {
    pub name: Option<String>,
    pub location: u32,
    pub ty: TypeInner,
}

#[derive(Debug, Default)]
pub(crate) struct StageInterface {
    pub inputs: Vec<InterfaceVar>,
    pub outputs: Vec<InterfaceVar>,
}

/// What linking produces besides the stages themselves.
#[derive(Debug)]
pub(crate) struct LinkedInterface {
    pub vertex_inputs: Vec<VertexInput>,
    pub blocks: Vec<UniformBlockLayout>,
}

pub(crate) fn entry_point(module: &Module, stage: ShaderStage) -> Option<&naga::EntryPoint> {
    let stage = stage.naga();
    module.entry_points.iter().find(|ep| ep.stage == stage)
}

pub(crate) fn stage_interface(compiled: &CompiledStage) -> StageInterface {
    let module = &compiled.module;
    let mut iface = StageInterface::default();
    let Some(ep) = entry_point(module, compiled.stage) else {
        return iface;
    };

    for arg in &ep.function.arguments {
        collect(module, arg.ty, arg.binding.as_ref(), arg.name.as_deref(), &mut iface.inputs);
    }
    if let Some(result) = &ep.function.result {
        collect(module, result.ty, result.binding.as_ref(), None, &mut iface.outputs);
    }

    iface.inputs.sort_by_key(|v| v.location);
    iface.outputs.sort_by_key(|v| v.location);
    iface
}

// Entry points may take or return structs whose members carry the bindings.
fn collect(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    name: Option<&str>,
    out: &mut Vec<InterfaceVar>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(InterfaceVar {
            name: name.map(str::to_owned),
            location: *location,
            ty: module.types[ty].inner.clone(),
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    collect(module, m.ty, m.binding.as_ref(), m.name.as_deref(), out);
                }
            }
        }
    }
}

pub(crate) fn uniform_blocks(module: &Module) -> Vec<UniformBlockLayout> {
    module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == naga::AddressSpace::Uniform)
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            let ty = &module.types[var.ty];
            let TypeInner::Struct { members, span } = &ty.inner else {
                return None;
            };

            let members = members
                .iter()
                .filter_map(|m| {
                    Some(UniformMember {
                        name: m.name.clone()?,
                        offset: m.offset,
                        kind: UniformKind::of(&module.types[m.ty].inner),
                    })
                })
                .collect();

            Some(UniformBlockLayout {
                name: ty.name.clone(),
                binding: BlockBinding {
                    group: binding.group,
                    binding: binding.binding,
                },
                size: *span,
                members,
            })
        })
        .collect()
}

/// Checks that the stages fit together and merges their uniform blocks.
pub(crate) fn link(
    vertex: &CompiledStage,
    fragment: &CompiledStage,
) -> Result<LinkedInterface, String> {
    let vs = stage_interface(vertex);
    let fs = stage_interface(fragment);

    for input in &fs.inputs {
        let name = input.name.as_deref().unwrap_or("<unnamed>");
        let Some(output) = vs.outputs.iter().find(|o| o.location == input.location) else {
            return Err(format!(
                "fragment input `{name}` at location {} is not written by the vertex stage",
                input.location
            ));
        };
        if output.ty != input.ty {
            return Err(format!(
                "fragment input `{name}` at location {} is {} but the vertex stage writes {}",
                input.location,
                describe(&input.ty),
                describe(&output.ty),
            ));
        }
    }

    let blocks = merge_blocks(
        uniform_blocks(&vertex.module),
        uniform_blocks(&fragment.module),
    )?;

    let vertex_inputs = vs
        .inputs
        .into_iter()
        .map(|v| {
            let (components, float) = match &v.ty {
                TypeInner::Scalar(s) => (1, s.kind == naga::ScalarKind::Float),
                TypeInner::Vector { size, scalar } => {
                    (*size as u32, scalar.kind == naga::ScalarKind::Float)
                }
                _ => (0, false),
            };
            VertexInput {
                name: v.name,
                location: v.location,
                components,
                float,
            }
        })
        .collect();

    Ok(LinkedInterface {
        vertex_inputs,
        blocks,
    })
}

fn merge_blocks(
    vertex: Vec<UniformBlockLayout>,
    fragment: Vec<UniformBlockLayout>,
) -> Result<Vec<UniformBlockLayout>, String> {
    let mut merged: BTreeMap<BlockBinding, UniformBlockLayout> = BTreeMap::new();

    for block in vertex.into_iter().chain(fragment) {
        let b = block.binding;
        if b.group != 0 {
            return Err(format!(
                "uniform block `{}` uses set {}; only set 0 is supported",
                block.name.as_deref().unwrap_or("<unnamed>"),
                b.group
            ));
        }
        match merged.get(&b) {
            Some(existing) if existing.size != block.size || existing.members != block.members => {
                return Err(format!(
                    "uniform block at set {} binding {} is declared differently by the two stages",
                    b.group, b.binding
                ));
            }
            Some(_) => {}
            None => {
                merged.insert(b, block);
            }
        }
    }

    Ok(merged.into_values().collect())
}

fn describe(ty: &TypeInner) -> String {
    fn scalar_prefix(kind: naga::ScalarKind) -> &'static str {
        match kind {
            naga::ScalarKind::Float => "",
            naga::ScalarKind::Sint => "i",
            naga::ScalarKind::Uint => "u",
            naga::ScalarKind::Bool => "b",
            _ => "?",
        }
    }

    match ty {
        TypeInner::Scalar(s) => match s.kind {
            naga::ScalarKind::Float => "float".to_owned(),
            naga::ScalarKind::Sint => "int".to_owned(),
            naga::ScalarKind::Uint => "uint".to_owned(),
            naga::ScalarKind::Bool => "bool".to_owned(),
            _ => format!("{s:?}"),
        },
        TypeInner::Vector { size, scalar } => {
            format!("{}vec{}", scalar_prefix(scalar.kind), *size as u32)
        }
        TypeInner::Matrix { columns, rows, .. } => {
            format!("mat{}x{}", *columns as u32, *rows as u32)
        }
        other => format!("{other:?}"),
    }
}

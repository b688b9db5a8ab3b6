//! Vertex attribute layout: which CPU arrays feed which shader input slots.

use std::fmt;

use wgpu::util::DeviceExt;

use crate::mesh::COMPONENTS;
use crate::shader::ShaderProgram;

/// Per-vertex attribute streams understood by the renderer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum VertexAttribute {
    Position,
    Color,
    Normal,
}

/// Attribute → shader input location.
///
/// Indexed by `VertexAttribute as usize`; a new attribute is one more row.
pub const ATTRIBUTE_SLOTS: [(VertexAttribute, u32); 3] = [
    (VertexAttribute::Position, 0),
    (VertexAttribute::Color, 1),
    (VertexAttribute::Normal, 2),
];

const FLOAT_SIZE: u64 = std::mem::size_of::<f32>() as u64;

impl VertexAttribute {
    pub fn slot(self) -> u32 {
        ATTRIBUTE_SLOTS[self as usize].1
    }

    pub fn components(self) -> u32 {
        COMPONENTS as u32
    }

    /// Size of one element in bytes.
    pub fn size(self) -> u64 {
        u64::from(self.components()) * FLOAT_SIZE
    }

    fn format(self) -> wgpu::VertexFormat {
        wgpu::VertexFormat::Float32x3
    }
}

impl fmt::Display for VertexAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Position => "position",
            Self::Color => "color",
            Self::Normal => "normal",
        })
    }
}

/// A stride of 0 means tightly packed: the stride is the element size.
pub fn resolve_stride(declared: u64, element_size: u64) -> u64 {
    if declared == 0 { element_size } else { declared }
}

/// One attribute inside a vertex buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeBinding {
    pub attribute: VertexAttribute,
    pub slot: u32,
    pub components: u32,
    pub offset: u64,
}

/// Layout of one vertex buffer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BufferLayout {
    pub stride: u64,
    pub bindings: Vec<AttributeBinding>,
}

impl BufferLayout {
    fn floats_per_vertex(&self) -> usize {
        (self.stride / FLOAT_SIZE) as usize
    }
}

/// Full attribute layout of a mesh.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct AttributeLayout {
    buffers: Vec<BufferLayout>,
}

impl AttributeLayout {
    /// One tightly packed buffer per attribute, each starting at offset 0.
    pub fn planar(attributes: &[VertexAttribute]) -> Self {
        let buffers = attributes
            .iter()
            .map(|&attribute| BufferLayout {
                stride: resolve_stride(0, attribute.size()),
                bindings: vec![AttributeBinding {
                    attribute,
                    slot: attribute.slot(),
                    components: attribute.components(),
                    offset: 0,
                }],
            })
            .collect();
        Self { buffers }
    }

    /// A single buffer with the attributes packed one after another per vertex.
    pub fn interleaved(attributes: &[VertexAttribute]) -> Self {
        let mut offset = 0;
        let bindings = attributes
            .iter()
            .map(|&attribute| {
                let binding = AttributeBinding {
                    attribute,
                    slot: attribute.slot(),
                    components: attribute.components(),
                    offset,
                };
                offset += attribute.size();
                binding
            })
            .collect();
        Self {
            buffers: vec![BufferLayout {
                stride: offset,
                bindings,
            }],
        }
    }

    pub fn buffers(&self) -> &[BufferLayout] {
        &self.buffers
    }

    pub fn binding(&self, slot: u32) -> Option<&AttributeBinding> {
        self.buffers
            .iter()
            .flat_map(|b| &b.bindings)
            .find(|b| b.slot == slot)
    }

    /// Every vertex input of a linked program must be fed with a matching width.
    ///
    /// Unlinked programs draw nothing and always pass.
    pub fn check_against(&self, program: &ShaderProgram) -> Result<(), LayoutError> {
        for input in program.vertex_inputs() {
            let Some(binding) = self.binding(input.location) else {
                return Err(LayoutError::MissingAttribute {
                    location: input.location,
                    name: input.name.clone(),
                });
            };
            if !input.float || binding.components != input.components {
                return Err(LayoutError::ComponentMismatch {
                    location: input.location,
                    expected: input.components,
                    provided: binding.components,
                });
            }
        }
        Ok(())
    }

    /// wgpu attribute descriptors, one list per buffer.
    pub(crate) fn wgpu_attributes(&self) -> Vec<Vec<wgpu::VertexAttribute>> {
        self.buffers
            .iter()
            .map(|b| {
                b.bindings
                    .iter()
                    .map(|a| wgpu::VertexAttribute {
                        format: a.attribute.format(),
                        offset: a.offset,
                        shader_location: a.slot,
                    })
                    .collect()
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// The program reads a location no attribute is bound to.
    MissingAttribute { location: u32, name: Option<String> },
    /// The attribute at a location has the wrong width for the shader input.
    ComponentMismatch { location: u32, expected: u32, provided: u32 },
    /// An array does not hold whole vertices, or whole triangles.
    PartialData { attribute: VertexAttribute, len: usize },
    /// Parallel arrays disagree on the vertex count.
    VertexCountMismatch { attribute: VertexAttribute, expected: usize, found: usize },
    /// Number of buffers does not match the layout.
    BufferCountMismatch { expected: usize, found: usize },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingAttribute { location, name } => write!(
                f,
                "vertex input `{}` at location {location} has no attribute bound",
                name.as_deref().unwrap_or("<unnamed>")
            ),
            Self::ComponentMismatch { location, expected, provided } => write!(
                f,
                "vertex input at location {location} expects {expected} float components, attribute provides {provided}"
            ),
            Self::PartialData { attribute, len } => write!(
                f,
                "{attribute} data has {len} floats, which is not a whole number of triangles"
            ),
            Self::VertexCountMismatch { attribute, expected, found } => write!(
                f,
                "{attribute} data has {found} vertices, expected {expected}"
            ),
            Self::BufferCountMismatch { expected, found } => {
                write!(f, "layout needs {expected} vertex buffers, got {found}")
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// Receives per-slot vertex buffer bindings (a render pass, or a recorder in tests).
pub trait VertexSink<B> {
    fn bind_vertex_buffer(&mut self, index: u32, buffer: &B);
}

impl VertexSink<wgpu::Buffer> for wgpu::RenderPass<'_> {
    fn bind_vertex_buffer(&mut self, index: u32, buffer: &wgpu::Buffer) {
        self.set_vertex_buffer(index, buffer.slice(..));
    }
}

/// Vertex buffers bound to a layout, with per-buffer enabled flags.
///
/// Bindings are re-declared on every [`bind`](Self::bind) and disabled again by
/// [`release`](Self::release) once the draw is recorded.
#[derive(Debug)]
pub struct VertexArray<B> {
    layout: AttributeLayout,
    buffers: Vec<B>,
    enabled: Vec<bool>,
    vertex_count: u32,
}

impl<B> VertexArray<B> {
    pub fn new(layout: AttributeLayout, buffers: Vec<B>, vertex_count: u32) -> Result<Self, LayoutError> {
        if buffers.len() != layout.buffers.len() {
            return Err(LayoutError::BufferCountMismatch {
                expected: layout.buffers.len(),
                found: buffers.len(),
            });
        }
        let enabled = vec![false; buffers.len()];
        Ok(Self {
            layout,
            buffers,
            enabled,
            vertex_count,
        })
    }

    pub fn layout(&self) -> &AttributeLayout {
        &self.layout
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Whether the buffer feeding `slot` is currently enabled.
    pub fn is_enabled(&self, slot: u32) -> bool {
        self.layout
            .buffers
            .iter()
            .position(|b| b.bindings.iter().any(|a| a.slot == slot))
            .is_some_and(|i| self.enabled[i])
    }

    /// Enables every slot and declares its buffer to `sink`. Returns the vertex count to draw.
    pub fn bind<S: VertexSink<B>>(&mut self, sink: &mut S) -> u32 {
        for (i, buffer) in self.buffers.iter().enumerate() {
            sink.bind_vertex_buffer(i as u32, buffer);
            self.enabled[i] = true;
        }
        self.vertex_count
    }

    pub fn release(&mut self) {
        self.enabled.fill(false);
    }

    pub fn into_buffers(self) -> Vec<B> {
        self.buffers
    }
}

/// Vertex count shared by parallel planar arrays.
fn planar_vertex_count(arrays: &[(VertexAttribute, &[f32])]) -> Result<usize, LayoutError> {
    let mut expected = None;
    for &(attribute, data) in arrays {
        let per_vertex = attribute.components() as usize;
        if data.len() % (per_vertex * 3) != 0 {
            return Err(LayoutError::PartialData {
                attribute,
                len: data.len(),
            });
        }
        let count = data.len() / per_vertex;
        match expected {
            None => expected = Some(count),
            Some(e) if e != count => {
                return Err(LayoutError::VertexCountMismatch {
                    attribute,
                    expected: e,
                    found: count,
                });
            }
            Some(_) => {}
        }
    }
    Ok(expected.unwrap_or(0))
}

fn interleaved_vertex_count(layout: &AttributeLayout, data: &[f32]) -> Result<usize, LayoutError> {
    let Some(buffer) = layout.buffers.first() else {
        return Ok(0);
    };
    let per_vertex = buffer.floats_per_vertex();
    if per_vertex == 0 || data.len() % (per_vertex * 3) != 0 {
        return Err(LayoutError::PartialData {
            attribute: buffer.bindings.first().map_or(VertexAttribute::Position, |b| b.attribute),
            len: data.len(),
        });
    }
    Ok(data.len() / per_vertex)
}

/// Uploads one GPU buffer per attribute array.
pub fn upload_planar(
    device: &wgpu::Device,
    label: &str,
    arrays: &[(VertexAttribute, &[f32])],
) -> Result<VertexArray<wgpu::Buffer>, LayoutError> {
    let vertex_count = planar_vertex_count(arrays)?;
    let attributes: Vec<VertexAttribute> = arrays.iter().map(|(a, _)| *a).collect();

    let buffers = arrays
        .iter()
        .map(|(attribute, data)| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label} {attribute} vbo")),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            })
        })
        .collect();

    VertexArray::new(AttributeLayout::planar(&attributes), buffers, vertex_count as u32)
}

/// Uploads one interleaved GPU buffer.
pub fn upload_interleaved(
    device: &wgpu::Device,
    label: &str,
    attributes: &[VertexAttribute],
    data: &[f32],
) -> Result<VertexArray<wgpu::Buffer>, LayoutError> {
    let layout = AttributeLayout::interleaved(attributes);
    let vertex_count = interleaved_vertex_count(&layout, data)?;

    let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("{label} vbo")),
        contents: bytemuck::cast_slice(data),
        usage: wgpu::BufferUsages::VERTEX,
    });

    VertexArray::new(layout, vec![buffer], vertex_count as u32)
}

use glam::{Mat4, Vec3};

use crate::shader::{BlockBinding, UniformBlockLayout, UniformKind, UniformSlot};

/// Destination of per-frame uniform writes.
///
/// Writes go to a slot resolved from a linked program; a write whose slot does
/// not fit the target is dropped.
pub trait UniformSink {
    fn write_mat4(&mut self, slot: UniformSlot, value: &Mat4);
    fn write_vec3(&mut self, slot: UniformSlot, value: Vec3);
    fn write_f32(&mut self, slot: UniformSlot, value: f32);
}

/// CPU images of a program's uniform blocks, uploaded once per frame.
#[derive(Debug, Clone, Default)]
pub struct UniformStorage {
    blocks: Vec<(BlockBinding, Vec<u8>)>,
}

impl UniformStorage {
    /// Zeroed storage for every block in `layouts`.
    pub fn new(layouts: &[UniformBlockLayout]) -> Self {
        let blocks = layouts
            .iter()
            .map(|b| (b.binding, vec![0u8; b.size as usize]))
            .collect();
        Self { blocks }
    }

    pub fn bindings(&self) -> impl Iterator<Item = BlockBinding> + '_ {
        self.blocks.iter().map(|(b, _)| *b)
    }

    /// Bytes of the block at `binding`.
    pub fn bytes(&self, binding: BlockBinding) -> Option<&[u8]> {
        self.blocks
            .iter()
            .find(|(b, _)| *b == binding)
            .map(|(_, bytes)| bytes.as_slice())
    }

    fn range_mut(&mut self, slot: UniformSlot, len: usize) -> Option<&mut [u8]> {
        let bytes = self
            .blocks
            .iter_mut()
            .find(|(b, _)| *b == slot.block)
            .map(|(_, bytes)| bytes)?;
        let start = slot.offset as usize;
        bytes.get_mut(start..start.checked_add(len)?)
    }

    fn range(&self, slot: UniformSlot, len: usize) -> Option<&[u8]> {
        let start = slot.offset as usize;
        self.bytes(slot.block)?.get(start..start.checked_add(len)?)
    }

    fn write(&mut self, slot: UniformSlot, kind: UniformKind, data: &[u8]) {
        if slot.kind != kind {
            log::trace!("uniform write of {kind:?} to a {:?} slot dropped", slot.kind);
            return;
        }
        match self.range_mut(slot, data.len()) {
            Some(dst) => dst.copy_from_slice(data),
            None => log::trace!("uniform write at offset {} out of bounds", slot.offset),
        }
    }

    pub fn read_mat4(&self, slot: UniformSlot) -> Option<Mat4> {
        let bytes = self.range(slot, 64)?;
        let cols: [f32; 16] = bytemuck::pod_read_unaligned(bytes);
        Some(Mat4::from_cols_array(&cols))
    }

    pub fn read_vec3(&self, slot: UniformSlot) -> Option<Vec3> {
        let bytes = self.range(slot, 12)?;
        let v: [f32; 3] = bytemuck::pod_read_unaligned(bytes);
        Some(Vec3::from_array(v))
    }

    pub fn read_f32(&self, slot: UniformSlot) -> Option<f32> {
        let bytes = self.range(slot, 4)?;
        Some(bytemuck::pod_read_unaligned(bytes))
    }
}

impl UniformSink for UniformStorage {
    fn write_mat4(&mut self, slot: UniformSlot, value: &Mat4) {
        self.write(slot, UniformKind::Mat4, bytemuck::bytes_of(&value.to_cols_array()));
    }

    fn write_vec3(&mut self, slot: UniformSlot, value: Vec3) {
        self.write(slot, UniformKind::Vec3, bytemuck::bytes_of(&value.to_array()));
    }

    fn write_f32(&mut self, slot: UniformSlot, value: f32) {
        self.write(slot, UniformKind::F32, bytemuck::bytes_of(&value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOCK: BlockBinding = BlockBinding { group: 0, binding: 1 };

    fn storage() -> UniformStorage {
        UniformStorage::new(&[UniformBlockLayout {
            name: Some("Block".into()),
            binding: BLOCK,
            size: 80,
            members: Vec::new(),
        }])
    }

    fn slot(offset: u32, kind: UniformKind) -> UniformSlot {
        UniformSlot { block: BLOCK, offset, kind }
    }

    #[test]
    fn starts_zeroed() {
        let storage = storage();
        assert_eq!(storage.bytes(BLOCK).unwrap(), &[0u8; 80][..]);
        assert!(storage.bytes(BlockBinding { group: 0, binding: 7 }).is_none());
    }

    #[test]
    fn writes_land_at_offsets() {
        let mut storage = storage();
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        storage.write_mat4(slot(0, UniformKind::Mat4), &m);
        storage.write_vec3(slot(64, UniformKind::Vec3), Vec3::new(4.0, 5.0, 6.0));
        storage.write_f32(slot(76, UniformKind::F32), 50.0);

        assert_eq!(storage.read_mat4(slot(0, UniformKind::Mat4)), Some(m));
        assert_eq!(storage.read_vec3(slot(64, UniformKind::Vec3)), Some(Vec3::new(4.0, 5.0, 6.0)));
        assert_eq!(storage.read_f32(slot(76, UniformKind::F32)), Some(50.0));
        // column-major: translation is the last column
        assert_eq!(storage.read_f32(slot(48, UniformKind::F32)), Some(1.0));
    }

    #[test]
    fn out_of_bounds_write_is_dropped() {
        let mut storage = storage();
        storage.write_mat4(slot(32, UniformKind::Mat4), &Mat4::IDENTITY);
        assert_eq!(storage.bytes(BLOCK).unwrap(), &[0u8; 80][..]);
    }

    #[test]
    fn kind_mismatch_is_dropped() {
        let mut storage = storage();
        storage.write_f32(slot(0, UniformKind::Vec3), 1.0);
        assert_eq!(storage.bytes(BLOCK).unwrap(), &[0u8; 80][..]);
    }
}

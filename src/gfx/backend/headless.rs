//! In-memory rendering backend
//!
//! Keeps buffer contents as plain byte vectors and records every command it
//! receives, so the full frame pipeline can be driven and inspected without a
//! GPU.

use cgmath::Matrix4;

use super::{BackendError, BufferId, BufferKind, ProgramBindings, RenderBackend, UniformSlot};

/// A command received by [`HeadlessBackend`], in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCommand {
    BindProgram(ProgramBindings),
    Clear([f32; 4]),
    SetMatrix(UniformSlot, [[f32; 4]; 4]),
    SetVectors(UniformSlot, Vec<[f32; 4]>),
    SetFloat(UniformSlot, f32),
    DrawIndexed { count: u32, byte_offset: u64 },
    DrawArrays { first: u32, count: u32 },
    RequestFrame,
}

struct HeadlessBuffer {
    kind: BufferKind,
    label: String,
    bytes: Vec<u8>,
}

/// Backend that renders nothing and remembers everything
#[derive(Default)]
pub struct HeadlessBackend {
    buffers: Vec<HeadlessBuffer>,
    commands: Vec<BackendCommand>,
    program: Option<ProgramBindings>,
    frame_requests: usize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// All commands recorded since creation or the last [`take_commands`](Self::take_commands)
    pub fn commands(&self) -> &[BackendCommand] {
        &self.commands
    }

    /// Drains the recorded command list
    pub fn take_commands(&mut self) -> Vec<BackendCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Number of times a next frame was requested
    pub fn frame_requests(&self) -> usize {
        self.frame_requests
    }

    pub fn buffer_kind(&self, id: BufferId) -> Option<BufferKind> {
        self.buffers.get(id.0).map(|b| b.kind)
    }

    pub fn buffer_label(&self, id: BufferId) -> Option<&str> {
        self.buffers.get(id.0).map(|b| b.label.as_str())
    }

    /// Raw bytes of a buffer
    pub fn buffer_bytes(&self, id: BufferId) -> Option<&[u8]> {
        self.buffers.get(id.0).map(|b| b.bytes.as_slice())
    }

    /// Reads `count` consecutive 3-float elements starting at element `first`
    pub fn read_vec3s(&self, id: BufferId, first: usize, count: usize) -> Option<Vec<[f32; 3]>> {
        let bytes = self.buffer_bytes(id)?;
        let start = first * 12;
        let end = start + count * 12;
        if end > bytes.len() {
            return None;
        }
        Some(
            bytes[start..end]
                .chunks_exact(12)
                .map(|chunk| bytemuck::pod_read_unaligned::<[f32; 3]>(chunk))
                .collect(),
        )
    }

    /// Reads `count` consecutive 16-bit indices starting at element `first`
    pub fn read_u16s(&self, id: BufferId, first: usize, count: usize) -> Option<Vec<u16>> {
        let bytes = self.buffer_bytes(id)?;
        let start = first * 2;
        let end = start + count * 2;
        if end > bytes.len() {
            return None;
        }
        Some(
            bytes[start..end]
                .chunks_exact(2)
                .map(|chunk| u16::from_ne_bytes([chunk[0], chunk[1]]))
                .collect(),
        )
    }

    fn check_uniform_len(
        slot: UniformSlot,
        expected: usize,
        actual: usize,
    ) -> Result<(), BackendError> {
        if expected != actual {
            return Err(BackendError::UniformSize {
                slot: slot.name(),
                expected,
                actual,
            });
        }
        Ok(())
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_buffer(
        &mut self,
        kind: BufferKind,
        size: u64,
        label: &str,
    ) -> Result<BufferId, BackendError> {
        self.buffers.push(HeadlessBuffer {
            kind,
            label: label.to_string(),
            bytes: vec![0; size as usize],
        });
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn write_buffer(
        &mut self,
        buffer: BufferId,
        offset: u64,
        data: &[u8],
    ) -> Result<(), BackendError> {
        let target = self
            .buffers
            .get_mut(buffer.0)
            .ok_or(BackendError::UnknownBuffer(buffer))?;

        let size = target.bytes.len() as u64;
        if offset + data.len() as u64 > size {
            return Err(BackendError::WriteOutOfRange {
                buffer,
                offset,
                len: data.len(),
                size,
            });
        }

        let start = offset as usize;
        target.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn bind_program(&mut self, bindings: ProgramBindings) -> Result<(), BackendError> {
        for id in [bindings.positions, bindings.normals, bindings.indices] {
            if id.0 >= self.buffers.len() {
                return Err(BackendError::UnknownBuffer(id));
            }
        }
        self.program = Some(bindings);
        self.commands.push(BackendCommand::BindProgram(bindings));
        Ok(())
    }

    fn set_matrix(
        &mut self,
        slot: UniformSlot,
        matrix: &Matrix4<f32>,
    ) -> Result<(), BackendError> {
        match slot {
            UniformSlot::Projection | UniformSlot::ModelView => {
                self.commands
                    .push(BackendCommand::SetMatrix(slot, (*matrix).into()));
                Ok(())
            }
            _ => Err(BackendError::UniformType(slot.name())),
        }
    }

    fn set_vectors(
        &mut self,
        slot: UniformSlot,
        values: &[[f32; 4]],
    ) -> Result<(), BackendError> {
        match slot {
            UniformSlot::AmbientProduct
            | UniformSlot::DiffuseProduct
            | UniformSlot::SpecularProduct
            | UniformSlot::LightPosition => {
                Self::check_uniform_len(slot, crate::gfx::scene::LIGHT_COUNT, values.len())?;
                self.commands
                    .push(BackendCommand::SetVectors(slot, values.to_vec()));
                Ok(())
            }
            _ => Err(BackendError::UniformType(slot.name())),
        }
    }

    fn set_float(&mut self, slot: UniformSlot, value: f32) -> Result<(), BackendError> {
        if slot != UniformSlot::Shininess {
            return Err(BackendError::UniformType(slot.name()));
        }
        self.commands.push(BackendCommand::SetFloat(slot, value));
        Ok(())
    }

    fn draw_indexed(&mut self, count: u32, byte_offset: u64) -> Result<(), BackendError> {
        let program = self.program.ok_or(BackendError::NoProgram)?;
        let size = self.buffers[program.indices.0].bytes.len() as u64;
        if byte_offset + count as u64 * 2 > size {
            return Err(BackendError::WriteOutOfRange {
                buffer: program.indices,
                offset: byte_offset,
                len: count as usize * 2,
                size,
            });
        }
        self.commands
            .push(BackendCommand::DrawIndexed { count, byte_offset });
        Ok(())
    }

    fn draw_arrays(&mut self, first: u32, count: u32) -> Result<(), BackendError> {
        if self.program.is_none() {
            return Err(BackendError::NoProgram);
        }
        self.commands.push(BackendCommand::DrawArrays { first, count });
        Ok(())
    }

    fn clear(&mut self, color: [f32; 4]) -> Result<(), BackendError> {
        self.commands.push(BackendCommand::Clear(color));
        Ok(())
    }

    fn request_frame(&mut self) {
        self.frame_requests += 1;
        self.commands.push(BackendCommand::RequestFrame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_and_read_back() {
        let mut backend = HeadlessBackend::new();
        let id = backend
            .create_buffer(BufferKind::Vertex, 36, "positions")
            .unwrap();

        let points: [[f32; 3]; 2] = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        backend
            .write_buffer(id, 12, bytemuck::cast_slice(&points))
            .unwrap();

        let read = backend.read_vec3s(id, 0, 3).unwrap();
        assert_eq!(read[0], [0.0, 0.0, 0.0]);
        assert_eq!(read[1], [1.0, 2.0, 3.0]);
        assert_eq!(read[2], [4.0, 5.0, 6.0]);
        assert_eq!(backend.buffer_label(id), Some("positions"));
    }

    #[test]
    fn test_write_past_end_is_rejected() {
        let mut backend = HeadlessBackend::new();
        let id = backend.create_buffer(BufferKind::Index, 4, "indices").unwrap();

        let result = backend.write_buffer(id, 2, &[0u8; 4]);
        assert!(matches!(result, Err(BackendError::WriteOutOfRange { .. })));
        assert_eq!(backend.buffer_bytes(id).unwrap(), &[0u8; 4]);
    }

    #[test]
    fn test_draw_requires_program() {
        let mut backend = HeadlessBackend::new();
        assert!(matches!(
            backend.draw_arrays(0, 3),
            Err(BackendError::NoProgram)
        ));
    }

    #[test]
    fn test_uniform_slot_types_are_checked() {
        let mut backend = HeadlessBackend::new();
        assert!(backend
            .set_float(UniformSlot::ModelView, 1.0)
            .is_err());
        assert!(matches!(
            backend.set_vectors(UniformSlot::LightPosition, &[[0.0; 4]]),
            Err(BackendError::UniformSize { .. })
        ));
    }
}

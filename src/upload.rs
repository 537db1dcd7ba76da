//! Upload capability: the only path from CPU-side meshes and textures to a graphics backend.
//!
//! Scene assembly is written against these traits, so it runs unchanged against the wgpu
//! renderer or a recording stand-in in tests.

use crate::mesh::Mesh;
use crate::texture::TextureData;

/// Error type shared by both upload traits
pub trait UploadBackend {
    type Error: std::error::Error + Send + Sync + 'static;
}

pub trait UploadMesh: UploadBackend {
    type MeshHandle: Clone + std::fmt::Debug;

    /// Copy a mesh to the backend, returning a handle for later draw calls.
    fn upload_mesh(&mut self, mesh: &Mesh) -> Result<Self::MeshHandle, Self::Error>;

    /// Replace the geometry behind an existing handle, releasing the old buffers.
    fn update_mesh(&mut self, handle: &Self::MeshHandle, mesh: &Mesh) -> Result<(), Self::Error>;
}

pub trait UploadTexture: UploadBackend {
    type TextureHandle: Clone + std::fmt::Debug;

    fn upload_texture(&mut self, texture: &TextureData) -> Result<Self::TextureHandle, Self::Error>;

    /// Overwrite an existing texture's pixels (same dimensions).
    fn update_texture(
        &mut self,
        handle: &Self::TextureHandle,
        texture: &TextureData,
    ) -> Result<(), Self::Error>;
}

//! Phong materials and the tag-keyed material library

use glam::Vec3;

/// Phong surface response
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Multiplies the base color for ambient and diffuse terms
    pub diffuse_color: Vec3,
    /// Specular reflectivity per channel
    pub specular_color: Vec3,
    /// Specular exponent
    pub shininess: f32,
}

impl Material {
    /// Create a new material
    #[must_use]
    pub fn new(diffuse_color: Vec3, specular_color: Vec3, shininess: f32) -> Self {
        Self {
            diffuse_color,
            specular_color,
            shininess,
        }
    }

    /// Create a material with grey diffuse and specular responses
    #[must_use]
    pub fn grey(diffuse: f32, specular: f32, shininess: f32) -> Self {
        Self::new(Vec3::splat(diffuse), Vec3::splat(specular), shininess)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::grey(1.0, 0.5, 32.0)
    }
}

/// Materials looked up by tag
///
/// Tables are small, so lookup is a linear scan in definition order.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    materials: Vec<(String, Material)>,
}

impl MaterialLibrary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material under `tag`
    ///
    /// A tag that is already defined keeps its first material; the new one
    /// is ignored and `false` is returned.
    pub fn add(&mut self, tag: impl Into<String>, material: Material) -> bool {
        let tag = tag.into();
        if self.find(&tag).is_some() {
            log::warn!("Material '{tag}' is already defined");
            return false;
        }
        self.materials.push((tag, material));
        true
    }

    /// Builder form of [`add`](Self::add)
    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, material: Material) -> Self {
        self.add(tag, material);
        self
    }

    /// Material defined under `tag`
    #[must_use]
    pub fn find(&self, tag: &str) -> Option<&Material> {
        self.materials
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, m)| m)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_by_tag() {
        let library = MaterialLibrary::new()
            .with("ceramic", Material::grey(0.6, 1.0, 128.0))
            .with("straw", Material::grey(1.0, 0.35, 32.0));

        let ceramic = library.find("ceramic").unwrap();
        assert_eq!(ceramic.diffuse_color, Vec3::splat(0.6));
        assert_eq!(ceramic.shininess, 128.0);
        assert_eq!(library.find("straw").unwrap().specular_color, Vec3::splat(0.35));
    }

    #[test]
    fn test_missing_tag_is_none() {
        let library = MaterialLibrary::new().with("ceramic", Material::default());
        assert!(library.find("glass").is_none());
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut library = MaterialLibrary::new();
        assert!(library.add("liquid", Material::grey(1.0, 1.0, 96.0)));
        assert!(!library.add("liquid", Material::grey(0.0, 0.0, 1.0)));
        assert_eq!(library.len(), 1);
        assert_eq!(library.find("liquid").unwrap().shininess, 96.0);
    }
}

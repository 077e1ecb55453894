use glam::Vec3;

use crate::config::GameConfig;

use super::MaskType;

/// Local transform of one stacked mask visual, relative to the mask anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskVisual {
    pub mask: MaskType,
    pub order_index: usize,
    pub local_offset: Vec3,
    pub local_scale: f32,
}

impl MaskVisual {
    /// Placement used when a mask has no computed layer.
    pub fn unlayered(mask: MaskType) -> Self {
        Self {
            mask,
            order_index: 0,
            local_offset: Vec3::ZERO,
            local_scale: 1.0,
        }
    }
}

/// Pure layout of stacked mask visuals.
///
/// Layer `i` sits at `i * position_offset` with a uniform scale of
/// `min(1 + i * scale_increment, max_scale)`. The bare mask never gets a
/// layer and does not consume an index.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaskVisualLayout {
    pub bare_mask: MaskType,
    pub position_offset: Vec3,
    pub scale_increment: f32,
    pub max_scale: f32,
}

impl MaskVisualLayout {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            bare_mask: config.bare_mask,
            position_offset: Vec3::from_array(config.mask_layer_offset),
            scale_increment: config.mask_scale_increment,
            max_scale: config.mask_max_scale,
        }
    }

    pub fn scale_for(&self, layer: usize) -> f32 {
        (1.0 + layer as f32 * self.scale_increment).min(self.max_scale)
    }

    pub fn offset_for(&self, layer: usize) -> Vec3 {
        self.position_offset * layer as f32
    }

    /// Layers for `stack`, ordered from innermost to outermost.
    pub fn layers(&self, stack: &[MaskType]) -> Vec<MaskVisual> {
        stack
            .iter()
            .copied()
            .filter(|mask| *mask != self.bare_mask)
            .enumerate()
            .map(|(layer, mask)| MaskVisual {
                mask,
                order_index: layer,
                local_offset: self.offset_for(layer),
                local_scale: self.scale_for(layer),
            })
            .collect()
    }

    /// Layer of a single mask within `stack`, if it has one.
    pub fn visual_of(&self, stack: &[MaskType], mask: MaskType) -> Option<MaskVisual> {
        self.layers(stack).into_iter().find(|visual| visual.mask == mask)
    }
}

impl Default for MaskVisualLayout {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> MaskVisualLayout {
        MaskVisualLayout {
            bare_mask: MaskType::Wolf,
            position_offset: Vec3::new(0.0, 0.25, 0.0),
            scale_increment: 0.5,
            max_scale: 2.0,
        }
    }

    #[test]
    fn bare_mask_has_no_layer() {
        let layers = layout().layers(&[MaskType::Wolf]);
        assert!(layers.is_empty());
    }

    #[test]
    fn layers_skip_bare_mask_and_stack_upward() {
        let layers = layout().layers(&[MaskType::Wolf, MaskType::Sheep, MaskType::Pig]);
        assert_eq!(layers.len(), 2);

        assert_eq!(layers[0].mask, MaskType::Sheep);
        assert_eq!(layers[0].order_index, 0);
        assert_eq!(layers[0].local_offset, Vec3::ZERO);
        assert_eq!(layers[0].local_scale, 1.0);

        assert_eq!(layers[1].mask, MaskType::Pig);
        assert_eq!(layers[1].local_offset, Vec3::new(0.0, 0.25, 0.0));
        assert_eq!(layers[1].local_scale, 1.5);
    }

    #[test]
    fn scale_is_monotonic_and_clamped() {
        let layout = layout();
        let mut previous = 0.0;
        for layer in 0..16 {
            let scale = layout.scale_for(layer);
            assert!(scale >= previous);
            assert!(scale <= layout.max_scale);
            assert_eq!(layout.offset_for(layer), layout.position_offset * layer as f32);
            previous = scale;
        }
        assert_eq!(layout.scale_for(10), 2.0);
    }

    #[test]
    fn visual_lookup_matches_layers() {
        let stack = [MaskType::Sheep, MaskType::Wolf, MaskType::Cow];
        let visual = layout().visual_of(&stack, MaskType::Cow).unwrap();
        assert_eq!(visual.order_index, 1);
        assert!(layout().visual_of(&stack, MaskType::Wolf).is_none());
    }
}

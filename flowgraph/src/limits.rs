pub const MAX_NODES: usize = 50_000;
pub const MAX_EDGES: usize = 100_000;
pub const MAX_ID_LEN: usize = 256;
pub const MAX_COORD: f32 = 1.0e7;

pub fn in_coord_bounds(v: f32) -> bool {
    v.is_finite() && v.abs() <= MAX_COORD
}

//! Evaluation of batches of control point rows and of several channels sharing one grid.
//!
//! Every (channel, row) pair is an independent task; tasks run on the rayon thread pool
//! and own their scratch data. Row `k` of a batch is evaluated exactly like a single-row
//! call, so its result is bit-identical to it.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::{
    control_points::{check_finite, ControlPointSet},
    error::Result,
    method::{check_shape, check_x_cp_partials, SplineEngine, SplineEvaluation},
};

/// How the per-row blocks of a [BatchJacobian] are laid out in the full matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockLayout {
    /// Row `k` of the output depends on row `k` of the input only,
    /// full shape `(vec_size * n, vec_size * m)`.
    Diagonal,
    /// Every output row depends on the same input (`x_cp`), full shape `(vec_size * n, m)`.
    Stacked,
}

/// Partials of a batched output with respect to one input, one `(n, m)` block per row.
///
/// The zero blocks of the block-diagonal case are never stored.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchJacobian {
    layout: BlockLayout,
    blocks: Vec<DMatrix<f64>>,
}

impl BatchJacobian {
    pub fn new(layout: BlockLayout, blocks: Vec<DMatrix<f64>>) -> Self {
        BatchJacobian { layout, blocks }
    }

    pub fn layout(&self) -> BlockLayout {
        self.layout
    }

    pub fn blocks(&self) -> &[DMatrix<f64>] {
        &self.blocks
    }

    /// Partials of output row `k`.
    pub fn block(&self, k: usize) -> &DMatrix<f64> {
        &self.blocks[k]
    }

    pub fn vec_size(&self) -> usize {
        self.blocks.len()
    }

    /// Shape of the full matrix.
    pub fn shape(&self) -> (usize, usize) {
        let (n, m) = self.blocks.first().map(|b| b.shape()).unwrap_or((0, 0));
        match self.layout {
            BlockLayout::Diagonal => (self.vec_size() * n, self.vec_size() * m),
            BlockLayout::Stacked => (self.vec_size() * n, m),
        }
    }

    /// Full matrix, zero blocks included.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let (rows, cols) = self.shape();
        let mut dense = DMatrix::<f64>::zeros(rows, cols);

        for (k, block) in self.blocks.iter().enumerate() {
            let (n, m) = block.shape();
            let col = match self.layout {
                BlockLayout::Diagonal => k * m,
                BlockLayout::Stacked => 0,
            };
            dense.view_mut((k * n, col), (n, m)).copy_from(block);
        }
        dense
    }
}

/// Values and partials of one channel.
/// - `values` - `(vec_size, n)`,
/// - `d_y_cp` - block diagonal partials with respect to the control point values,
/// - `d_x_cp` - stacked partials with respect to the control point locations, if requested.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelEvaluation {
    pub values: DMatrix<f64>,
    pub d_y_cp: BatchJacobian,
    pub d_x_cp: Option<BatchJacobian>,
}

impl ChannelEvaluation {
    fn from_rows(rows: Vec<SplineEvaluation>, n: usize) -> Self {
        let mut values = DMatrix::<f64>::zeros(rows.len(), n);
        let mut d_y_cp = Vec::with_capacity(rows.len());
        let mut d_x_cp = Vec::with_capacity(rows.len());

        for (k, row) in rows.into_iter().enumerate() {
            values.row_mut(k).tr_copy_from(&row.values);
            d_y_cp.push(row.d_y_cp);
            if let Some(block) = row.d_x_cp {
                d_x_cp.push(block);
            }
        }

        let d_x_cp = if d_x_cp.is_empty() { None } else { Some(BatchJacobian::new(BlockLayout::Stacked, d_x_cp)) };
        ChannelEvaluation { values, d_y_cp: BatchJacobian::new(BlockLayout::Diagonal, d_y_cp), d_x_cp }
    }
}

/// Evaluates every row of `points` at `x_interp`.
pub fn evaluate_rows<E>(engine: &E, points: &ControlPointSet, x_interp: &[f64], x_cp_partials: bool) -> Result<ChannelEvaluation>
where
    E: SplineEngine + Sync,
{
    let mut channels = evaluate_channels(engine, std::slice::from_ref(points), x_interp, x_cp_partials)?;
    Ok(channels.remove(0))
}

/// Evaluates several channels sharing `x_interp`; results are in the order of `channels`.
///
/// The shapes of every channel and the query points are checked before any task is started;
/// the control points were validated when each [ControlPointSet] was built.
pub fn evaluate_channels<E>(
    engine: &E,
    channels: &[ControlPointSet],
    x_interp: &[f64],
    x_cp_partials: bool,
) -> Result<Vec<ChannelEvaluation>>
where
    E: SplineEngine + Sync,
{
    check_x_cp_partials(engine, x_cp_partials)?;
    for points in channels {
        check_shape(engine.name(), engine.min_points(), points.len(), points.len(), x_interp.len())?;
    }
    check_finite("x_interp", x_interp)?;

    let tasks: Vec<(usize, usize)> = channels
        .iter()
        .enumerate()
        .flat_map(|(c, points)| (0..points.vec_size()).map(move |k| (c, k)))
        .collect();

    let mut rows = tasks
        .par_iter()
        .map(|&(c, k)| {
            let points = &channels[c];
            engine.evaluate(points.x_cp(), &points.row(k), x_interp, x_cp_partials)
        })
        .collect::<Result<Vec<SplineEvaluation>>>()?
        .into_iter();

    Ok(channels
        .iter()
        .map(|points| {
            let channel_rows: Vec<SplineEvaluation> = rows.by_ref().take(points.vec_size()).collect();
            ChannelEvaluation::from_rows(channel_rows, x_interp.len())
        })
        .collect())
}

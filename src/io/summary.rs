use anyhow::Result;

use crate::ctx::Ctx;

pub fn format_summary(ctx: &Ctx) -> Result<String> {
    let version = env!("CARGO_PKG_VERSION");
    let dataset = ctx.dataset()?;
    let sampled = ctx.samples.as_ref().map(Vec::len).unwrap_or(0);
    let (genes, categories, collisions) = match &ctx.aggregation {
        Some(result) => (result.len(), result.categories().len(), result.collisions()),
        None => (0, 0, 0),
    };

    let mut out = String::new();
    out.push_str(&format!("kira-cellxgene v{}\n", version));
    out.push_str(&format!(
        "Input: {} cells, {} genes, nnz={}\n",
        dataset.cell_count(),
        dataset.gene_count(),
        dataset.nnz()
    ));
    out.push_str(&format!(
        "UMAP: {} sampled cells -> {}\n",
        sampled,
        ctx.config.umap_out.display()
    ));
    out.push_str(&format!(
        "Means: {} genes x {} cell types -> {}\n",
        genes,
        categories,
        ctx.config.means_out.display()
    ));
    if collisions > 0 {
        out.push_str(&format!(
            "Collisions: {} ({:?})\n",
            collisions, ctx.config.collision
        ));
    }
    Ok(out)
}

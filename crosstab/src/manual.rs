/*!

This is the long-form manual for `crosstab` and `totaltabs`.

## Input formats

Two kinds of exports are supported:
* `excel` workbooks with one table per sheet
* `text` tab-delimited text files holding many tables

### `excel`

Each sheet is one table. The number of the table is read from the sheet name,
starting at its first digit (`T12` is table `12`). Sheets whose name has no
digit are ignored, and so are the sheets before `firstTableSheetIndex`.

Under each stub label, the workbook prints the frequencies, then the
percentages (as fractions, `0.41` for 41%), then the stat letters:

|            | Total | Male | Female |
|------------|-------|------|--------|
|            | A     | B    | C      |
| Base       | 200   | 100  | 100    |
| Favorable  | 80    | 50   | 30     |
|            | 0.4   | 0.5  | 0.3    |
|            |       | C    |        |

If `indexSheetName` is set, the first-column cells of this sheet that mention
`Table` are used as the links of the tables: table `N` gets the `N`-th entry.

### `text`

Tables follow each other in the same file, separated by a line holding only
`|`. UTF-16 files (with a byte order mark) and UTF-8 files are accepted. The
rows of a stub are recognised by their content: a percent sign marks the
percentages, digits mark the frequencies, and rows with letters only carry the
stat letters. The number of the table is taken from its `Table:` line.

## Structure of a table

```text
Project title                         <- header
Q5 Favorability by wave
Table: 3 - Weighted by: Weight
        Wave                          <- banner: variable row
        December  January  February   <- banner: category row
        A         B        C          <- stat letters
Unweighted Base  991  1334  1839      <- stubs
Base             988  1334  1839
Favorable        300  667   *
                 30%  50%   *
                      A
Cell Contents:                        <- footer
Statistics: Column Proportions: 95%: A/B/C
```

The banner rows come in pairs (variable, categories). A blank category cell
takes the value of the closest populated cell on its left, so that a merged
header applies to all the columns under it.

`*` (small base) and `-` (undefined) cells are never counted as numbers.

## Stat batches and Max Diff

A stat batch is a set of banner letters tested against one another. Batches
are written `AB,CD,EF` or, when they are long, `A/B/C,D/E`. When no batch is
configured, the batches printed in the `Statistics:` line are used.

For every response row and every batch, the `Max Diff N` column holds the
spread between the highest and the lowest percentage of the batch. It is empty
when fewer than two percentages are available. The lowest value starts from
the first member of the batch (zero if it is suppressed).

## Configuration

`totaltabs` reads a JSON configuration file:

```text
{
  "outputSettings": {
    "projectName": "Brand tracker",
    "summaryFile": "summary.json",
    "flatFile": "tables.csv"
  },
  "tabSources": [
    { "provider": "text", "filePath": "tables.txt" }
  ],
  "statTesting": { "batches": "ABC", "confidenceLevel": 0.95 },
  "excludedTables": ["56", "113"],
  "skippedStubLabels": ["Mean"]
}
```

Options of `tabSources`:
 - `provider` (`excel` or `text`)
 - `filePath`: relative to the configuration file
 - `firstTableSheetIndex` (number, optional, `excel` only)
 - `indexSheetName` (string, optional, `excel` only)
 - `tableDelimiter` (string, default `|`, `text` only)
 - `fieldDelimiter` (string, default tab, `text` only)

Options of `statTesting`:
 - `batches` (string, optional)
 - `confidenceLevel`: one of 0.80, 0.85, 0.90, 0.95 (default) and 0.99
 - `recomputeSignificance` (bool, optional): checks the printed letters
   against a two-proportion z test and reports the differences

The command line options `--batches`, `--exclude`, `--confidence`, `--out`
and `--flat-out` override the values of the configuration file.

 */
